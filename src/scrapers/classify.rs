//! Decides which listing field a text fragment belongs to, from the shape of
//! the open-tag stack around it.
//!
//! Rules are tried in `RULES` order and the first match wins.

use crate::models::Listing;
use crate::scrapers::price::PriceNormalizer;
use crate::scrapers::types::ListingMarkers;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

static ROOMS: OnceLock<Regex> = OnceLock::new();
static AREA: OnceLock<Regex> = OnceLock::new();

/// An open tag on the ancestor stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attrs: BTreeMap<String, String>,
}

impl Tag {
    pub fn new<'a>(name: &str, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            name: name.to_string(),
            attrs: attrs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// A tag with no attributes
    pub fn bare(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Exactly one attribute, `class="<class>"`
    fn has_only_class(&self, class: &str) -> bool {
        self.attrs.len() == 1 && self.attr("class") == Some(class)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Price,
    Summary,
    Agency,
    AdditionalInfo,
}

pub struct Rule {
    pub field: Field,
    matches: fn(&ListingMarkers, &[Tag], &str) -> bool,
}

impl Rule {
    pub fn matches(&self, markers: &ListingMarkers, stack: &[Tag], text: &str) -> bool {
        (self.matches)(markers, stack, text)
    }
}

pub const RULES: [Rule; 4] = [
    Rule {
        field: Field::Price,
        matches: is_price,
    },
    Rule {
        field: Field::Summary,
        matches: is_summary,
    },
    Rule {
        field: Field::Agency,
        matches: is_agency,
    },
    Rule {
        field: Field::AdditionalInfo,
        matches: is_additional_info,
    },
];

/// Three nested divs, the innermost carrying only the price class.
fn is_price(markers: &ListingMarkers, stack: &[Tag], _text: &str) -> bool {
    match stack {
        [.., a, b, c] => {
            a.is("div") && b.is("div") && c.is("div") && c.has_only_class(&markers.price_class)
        }
        _ => false,
    }
}

fn is_summary(markers: &ListingMarkers, stack: &[Tag], _text: &str) -> bool {
    stack
        .last()
        .is_some_and(|t| t.is("div") && t.attr("class") == Some(markers.summary_class.as_str()))
}

fn is_agency(markers: &ListingMarkers, stack: &[Tag], text: &str) -> bool {
    stack.last().is_some_and(|t| t.is("span")) && text.trim() == markers.agency_word
}

fn is_additional_info(_markers: &ListingMarkers, stack: &[Tag], _text: &str) -> bool {
    match stack {
        [.., outer, inner] => outer.is("div") && inner.is("div") && inner.attrs.is_empty(),
        _ => false,
    }
}

pub fn classify(markers: &ListingMarkers, stack: &[Tag], text: &str) -> Option<Field> {
    RULES
        .iter()
        .find(|rule| rule.matches(markers, stack, text))
        .map(|rule| rule.field)
}

impl Field {
    pub fn apply(self, listing: &mut Listing, text: &str, prices: &PriceNormalizer) {
        match self {
            Field::Price => {
                if let Some(price) = prices.normalize(text) {
                    listing.price = Some(price);
                }
            }
            Field::Summary => apply_summary(listing, text),
            Field::Agency => listing.agency = true,
            Field::AdditionalInfo => listing.additional_info = Some(text.trim().to_string()),
        }
    }
}

/// Rooms from "<n> սեն", area from "<n> ք.մ."
pub fn apply_summary(listing: &mut Listing, text: &str) {
    let rooms = ROOMS.get_or_init(|| Regex::new(r"([0-9]+) սեն").unwrap());
    // unescaped dots, so "ք մ " matches too
    let area = AREA.get_or_init(|| Regex::new(r"([0-9]+) ք.մ.").unwrap());

    if let Some(n) = rooms.captures(text).and_then(|caps| caps[1].parse().ok()) {
        listing.rooms = Some(n);
    }
    if let Some(n) = area.captures(text).and_then(|caps| caps[1].parse().ok()) {
        listing.area = Some(n);
    }
    listing.summary = Some(text.trim().to_string());
}

/// Thumbnail address of an image tag, if it is lazy-loaded.
pub fn thumbnail<'t>(markers: &ListingMarkers, tag: &'t Tag) -> Option<&'t str> {
    if !tag.is("img") {
        return None;
    }
    tag.attr(&markers.thumbnail_attr).filter(|src| !src.is_empty())
}
