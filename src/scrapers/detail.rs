//! Posting dates from detail pages.

use crate::models::Listing;
use crate::scrapers::error::ScrapeError;
use crate::scrapers::fetch::Fetcher;
use crate::scrapers::types::MissingDatePolicy;
use chrono::{DateTime, FixedOffset};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

static POSTED_SELECTOR: OnceLock<Selector> = OnceLock::new();

const POSTED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Reads `<span itemprop="datePosted" content="...">` from a detail page.
pub fn parse_posted_at(markup: &str) -> Option<DateTime<FixedOffset>> {
    let selector = POSTED_SELECTOR
        .get_or_init(|| Selector::parse(r#"span[itemprop="datePosted"]"#).unwrap());
    let document = Html::parse_document(markup);
    let content = document
        .select(selector)
        .find_map(|el| el.value().attr("content"))?;

    DateTime::parse_from_str(content.trim(), POSTED_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(content.trim()))
        .map_err(|e| debug!("Unparseable posting date {:?}: {}", content, e))
        .ok()
}

pub struct DetailEnricher<'a> {
    fetcher: &'a Fetcher,
    chunk_size: usize,
    on_missing: MissingDatePolicy,
}

impl<'a> DetailEnricher<'a> {
    pub fn new(fetcher: &'a Fetcher, chunk_size: usize, on_missing: MissingDatePolicy) -> Self {
        Self {
            fetcher,
            chunk_size: chunk_size.max(1),
            on_missing,
        }
    }

    /// Fetch every listing's detail page, chunk by chunk, and set `posted_at`.
    ///
    /// A detail page that could not be fetched leaves the listing as is. A
    /// fetched page without a posting date is handled per `on_missing`.
    pub async fn enrich(&self, mut listings: Vec<Listing>) -> Result<Vec<Listing>, ScrapeError> {
        let mut missing = HashSet::new();

        for chunk in listings.chunks_mut(self.chunk_size) {
            let urls: Vec<String> = chunk.iter().map(|l| l.url.clone()).collect();
            let pages = self.fetcher.fetch_all(&urls).await;

            for (listing, page) in chunk.iter_mut().zip(pages) {
                let Some(page) = page else {
                    warn!("Could not fetch detail page {}", listing.url);
                    continue;
                };
                match parse_posted_at(&page) {
                    Some(posted_at) => listing.posted_at = Some(posted_at),
                    None => {
                        if self.on_missing == MissingDatePolicy::Fail {
                            return Err(ScrapeError::MissingPostingDate {
                                url: listing.url.clone(),
                            });
                        }
                        warn!("No posting date on {}", listing.url);
                        missing.insert(listing.url.clone());
                    }
                }
            }
        }

        if self.on_missing == MissingDatePolicy::Drop && !missing.is_empty() {
            info!("Dropping {} listings without a posting date", missing.len());
            listings.retain(|l| !missing.contains(&l.url));
        }

        Ok(listings)
    }
}
