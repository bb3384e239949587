use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// One rental listing extracted from a results page.
///
/// Identity is the detail-page url alone: two listings with the same url
/// compare equal and hash identically whatever their other fields hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub url: String,
    /// Monthly price in AMD.
    pub price: Option<f64>,
    pub rooms: Option<u32>,
    /// Floor area in square meters.
    pub area: Option<u32>,
    pub agency: bool,
    pub summary: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
    pub thumbnail_url: Option<String>,
    pub posted_at: Option<DateTime<FixedOffset>>,
}

impl Listing {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            price: None,
            rooms: None,
            area: None,
            agency: false,
            summary: None,
            additional_info: None,
            thumbnail_url: None,
            posted_at: None,
        }
    }
}

impl PartialEq for Listing {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Listing {}

impl Hash for Listing {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let posted = self
            .posted_at
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| "?".to_string());
        let price = self
            .price
            .map(|p| format!("{:.0}", p))
            .unwrap_or_else(|| "?".to_string());
        let rooms = self.rooms.map(|r| r.to_string()).unwrap_or_else(|| "?".to_string());
        let area = self.area.map(|a| a.to_string()).unwrap_or_else(|| "?".to_string());
        let agency = if self.agency { " (Agency)" } else { "" };

        write!(
            f,
            "[{}] {}{}: {} AMD, {} rooms, {} sqm",
            posted, self.url, agency, price, rooms, area
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_is_url_only() {
        let mut a = Listing::new("https://www.list.am/item/1");
        a.price = Some(120_000.0);
        a.agency = true;
        let mut b = Listing::new("https://www.list.am/item/1");
        b.rooms = Some(2);

        assert_eq!(a, b);

        let set: HashSet<Listing> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_set_keeps_first_inserted() {
        let mut first = Listing::new("https://www.list.am/item/7");
        first.price = Some(90_000.0);
        let second = Listing::new("https://www.list.am/item/7");

        let mut set = HashSet::new();
        assert!(set.insert(first));
        assert!(!set.insert(second));
        assert_eq!(set.iter().next().unwrap().price, Some(90_000.0));
    }

    #[test]
    fn test_display_marks_agency() {
        let mut listing = Listing::new("https://www.list.am/item/3");
        listing.agency = true;
        listing.price = Some(150_000.0);
        listing.rooms = Some(2);

        let line = listing.to_string();
        assert!(line.contains("(Agency)"));
        assert!(line.contains("150000 AMD"));
        assert!(line.contains("2 rooms"));
        assert!(line.contains("? sqm"));
    }
}
