use crate::models::Listing;
use crate::scrapers::detail::DetailEnricher;
use crate::scrapers::error::ScrapeError;
use crate::scrapers::fetch::{Fetcher, HttpTransport, Transport};
use crate::scrapers::filters::FilterSet;
use crate::scrapers::page::parse_page;
use crate::scrapers::paginate::Paginator;
use crate::scrapers::price::PriceNormalizer;
use crate::scrapers::traits::ListingScraper;
use crate::scrapers::types::{MalformedPagePolicy, ScrapePolicy, SearchParams, SiteConfig};
use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// list.am rental scraper
pub struct ListAmScraper {
    site: SiteConfig,
    params: SearchParams,
    policy: ScrapePolicy,
    prices: PriceNormalizer,
    fetcher: Fetcher,
}

impl ListAmScraper {
    /// Create a scraper talking to the site over HTTP
    pub fn new(site: SiteConfig, params: SearchParams) -> Result<Self, ScrapeError> {
        let transport = HttpTransport::new(&site)?;
        Ok(Self::with_transport(site, params, Arc::new(transport)))
    }

    pub fn with_transport(
        site: SiteConfig,
        params: SearchParams,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            site,
            params,
            policy: ScrapePolicy::default(),
            prices: PriceNormalizer::default(),
            fetcher: Fetcher::new(transport),
        }
    }

    pub fn with_policy(mut self, policy: ScrapePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_prices(mut self, prices: PriceNormalizer) -> Self {
        self.prices = prices;
        self
    }

    /// Every distinct listing on every results page
    pub async fn collect_listings(&self) -> Result<HashSet<Listing>, ScrapeError> {
        let template = self.params.url_template(&self.site);
        let paginator = Paginator::new(&self.fetcher, &template, self.policy.batch_size);
        let pages = paginator.pages();
        futures::pin_mut!(pages);

        let mut found = HashSet::new();
        let mut page_count = 0usize;

        while let Some(page) = pages.next().await {
            page_count += 1;
            match parse_page(&page, &self.site, &self.prices) {
                Ok(listings) => {
                    debug!("Page {} holds {} listings", page_count, listings.len());
                    found.extend(listings);
                }
                Err(e) if self.policy.on_malformed_page == MalformedPagePolicy::SkipPage => {
                    warn!("Skipping page {}: {}", page_count, e);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Found {} distinct listings on {} pages",
            found.len(),
            page_count
        );
        Ok(found)
    }

    /// Collect, keep what passes every filter, then enrich from detail pages
    pub async fn run(&self, filters: &FilterSet) -> Result<Vec<Listing>, ScrapeError> {
        let found = self.collect_listings().await?;
        let total = found.len();

        let survivors: Vec<Listing> = found.into_iter().filter(|l| filters.accepts(l)).collect();
        info!(
            "{} of {} listings passed {} filters",
            survivors.len(),
            total,
            filters.len()
        );

        let enricher = DetailEnricher::new(
            &self.fetcher,
            self.policy.detail_chunk_size,
            self.policy.on_missing_posting_date,
        );
        enricher.enrich(survivors).await
    }
}

#[async_trait]
impl ListingScraper for ListAmScraper {
    async fn scrape(&self, filters: &FilterSet) -> Result<Vec<Listing>> {
        info!(
            "Starting {} scrape for category {} area {}",
            self.source_name(),
            self.params.category,
            self.params.area_code
        );
        Ok(self.run(filters).await?)
    }

    fn source_name(&self) -> &'static str {
        "list.am"
    }
}
