//! Results-page parser.
//!
//! The raw markup is tokenized without tree construction, so the tag stream
//! reaches [`PageParser`] as written, unclosed and misnested tags included.
//! The parser keeps the stack of tags opened since the current listing's
//! detail link. A detail link always opens a fresh listing at the top level;
//! text seen while the stack is non-empty belongs to the most recent listing
//! and is routed by the classifier. Void elements are leaves and never go on
//! the stack.

use crate::models::Listing;
use crate::scrapers::classify::{self, Tag};
use crate::scrapers::error::ScrapeError;
use crate::scrapers::price::PriceNormalizer;
use crate::scrapers::types::SiteConfig;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use tracing::debug;

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

pub struct PageParser<'a> {
    site: &'a SiteConfig,
    prices: &'a PriceNormalizer,
    stack: Vec<Tag>,
    listings: Vec<Listing>,
}

impl<'a> PageParser<'a> {
    pub fn new(site: &'a SiteConfig, prices: &'a PriceNormalizer) -> Self {
        Self {
            site,
            prices,
            stack: Vec::new(),
            listings: Vec::new(),
        }
    }

    pub fn start_tag(&mut self, tag: Tag) -> Result<(), ScrapeError> {
        if let Some(href) = self.detail_href(&tag) {
            let url = format!("{}{}", self.site.origin, href);
            if !self.stack.is_empty() {
                return Err(ScrapeError::NestedListing {
                    url,
                    depth: self.stack.len(),
                });
            }
            self.listings.push(Listing::new(url));
            self.stack.push(tag);
            return Ok(());
        }

        if self.stack.is_empty() {
            return Ok(());
        }

        if is_void(&tag.name) {
            if let Some(src) = classify::thumbnail(&self.site.markers, &tag) {
                if let Some(listing) = self.listings.last_mut() {
                    listing.thumbnail_url = Some(src.to_string());
                }
            }
            return Ok(());
        }

        self.stack.push(tag);
        Ok(())
    }

    pub fn end_tag(&mut self, name: &str) {
        if self.stack.is_empty() || is_void(name) {
            return;
        }
        self.stack.pop();
        if self.stack.is_empty() {
            if let Some(listing) = self.listings.last() {
                debug!("Closed listing {}", listing.url);
            }
        }
    }

    pub fn text(&mut self, text: &str) {
        if self.stack.is_empty() || text.trim().is_empty() {
            return;
        }
        let Some(field) = classify::classify(&self.site.markers, &self.stack, text) else {
            return;
        };
        if let Some(listing) = self.listings.last_mut() {
            field.apply(listing, text, self.prices);
        }
    }

    /// Listings in document order
    pub fn finish(self) -> Vec<Listing> {
        self.listings
    }

    fn detail_href<'t>(&self, tag: &'t Tag) -> Option<&'t str> {
        if tag.name != "a" {
            return None;
        }
        tag.attr("href")
            .filter(|href| href.starts_with(&self.site.detail_prefix))
    }
}

/// Feeds tokenizer output into a [`PageParser`].
///
/// Character tokens are joined until the next tag so each text run reaches
/// the classifier whole. The first structural error stops further events.
struct PageSink<'a> {
    parser: PageParser<'a>,
    text: String,
    error: Option<ScrapeError>,
}

impl PageSink<'_> {
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.parser.text(&text);
        }
    }
}

impl TokenSink for PageSink<'_> {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        if self.error.is_some() {
            return TokenSinkResult::Continue;
        }

        match token {
            Token::CharacterTokens(chunk) => self.text.push_str(&chunk),
            Token::TagToken(tag) => {
                self.flush_text();
                let name: &str = &tag.name;
                match tag.kind {
                    TagKind::StartTag => {
                        let attrs = tag
                            .attrs
                            .iter()
                            .map(|attr| (&*attr.name.local, &*attr.value));
                        if let Err(e) = self.parser.start_tag(Tag::new(name, attrs)) {
                            self.error = Some(e);
                            return TokenSinkResult::Continue;
                        }
                        // contents of these are text, not markup
                        match name {
                            "script" => return TokenSinkResult::RawData(RawKind::ScriptData),
                            "style" => return TokenSinkResult::RawData(RawKind::Rawtext),
                            "title" | "textarea" => {
                                return TokenSinkResult::RawData(RawKind::Rcdata)
                            }
                            _ => {}
                        }
                    }
                    TagKind::EndTag => self.parser.end_tag(name),
                }
            }
            Token::CommentToken(_) | Token::EOFToken => self.flush_text(),
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

/// Parse one results page into partially filled listings.
pub fn parse_page(
    markup: &str,
    site: &SiteConfig,
    prices: &PriceNormalizer,
) -> Result<Vec<Listing>, ScrapeError> {
    let sink = PageSink {
        parser: PageParser::new(site, prices),
        text: String::new(),
        error: None,
    };
    let mut tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from(markup));
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();

    let mut sink = tokenizer.sink;
    sink.flush_text();
    match sink.error {
        Some(e) => Err(e),
        None => Ok(sink.parser.finish()),
    }
}
