use crate::models::Listing;
use crate::scrapers::filters::FilterSet;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for listing sources
#[async_trait]
pub trait ListingScraper: Send + Sync {
    /// Collect, filter and enrich listings from the source
    async fn scrape(&self, filters: &FilterSet) -> Result<Vec<Listing>>;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}
