//! Batch-wise walk over numbered results pages.
//!
//! Pages are requested `batch_size` at a time. The walk ends at the first
//! batch in which no page came back, so a batch that fails as a whole for
//! transient reasons also ends it and later pages are never seen.

use crate::scrapers::fetch::Fetcher;
use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, info};

pub const PAGE_PLACEHOLDER: &str = "{page}";

pub struct Paginator<'a> {
    fetcher: &'a Fetcher,
    template: &'a str,
    batch_size: u32,
}

impl<'a> Paginator<'a> {
    pub fn new(fetcher: &'a Fetcher, template: &'a str, batch_size: u32) -> Self {
        Self {
            fetcher,
            template,
            batch_size: batch_size.max(1),
        }
    }

    pub fn page_url(&self, page: u32) -> String {
        page_url(self.template, page)
    }

    /// Page bodies in page order, starting at page 1.
    ///
    /// The next batch is only requested once every body of the current one
    /// has been consumed.
    pub fn pages(&self) -> impl Stream<Item = String> + 'a {
        let fetcher = self.fetcher;
        let template = self.template;
        let batch_size = self.batch_size;

        stream::unfold(Some(1u32), move |next| async move {
            let first = next?;
            let urls: Vec<String> = (first..first + batch_size)
                .map(|page| page_url(template, page))
                .collect();

            let bodies: Vec<String> = fetcher
                .fetch_all(&urls)
                .await
                .into_iter()
                .flatten()
                .collect();

            if bodies.is_empty() {
                info!(
                    "No pages in batch {}..{}, stopping",
                    first,
                    first + batch_size - 1
                );
                return None;
            }

            debug!(
                "Fetched {}/{} pages starting at page {}",
                bodies.len(),
                urls.len(),
                first
            );
            Some((stream::iter(bodies), Some(first + batch_size)))
        })
        .flatten()
    }
}

fn page_url(template: &str, page: u32) -> String {
    template.replace(PAGE_PLACEHOLDER, &page.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::fetch::testing::{ok, status, MockTransport};
    use std::sync::Arc;

    const TEMPLATE: &str = "https://t.test/category/56/{page}?n=8";

    fn page_of(url: &str) -> u32 {
        let path = url.split('?').next().unwrap();
        path.rsplit('/').next().unwrap().parse().unwrap()
    }

    fn failing_from(k: u32) -> MockTransport {
        MockTransport::new(move |url| {
            let page = page_of(url);
            if page < k {
                ok(url, format!("page {}", page))
            } else {
                status(url, 404)
            }
        })
    }

    #[test]
    fn test_page_url() {
        let transport = Arc::new(failing_from(1));
        let fetcher = Fetcher::new(transport);
        let paginator = Paginator::new(&fetcher, TEMPLATE, 20);
        assert_eq!(paginator.page_url(3), "https://t.test/category/56/3?n=8");
    }

    #[tokio::test]
    async fn test_stops_at_first_empty_batch() {
        let transport = Arc::new(failing_from(25));
        let fetcher = Fetcher::new(transport.clone());
        let paginator = Paginator::new(&fetcher, TEMPLATE, 20);

        let pages: Vec<String> = paginator.pages().collect().await;

        let expected: Vec<String> = (1..25).map(|p| format!("page {}", p)).collect();
        assert_eq!(pages, expected);

        // batches 1-20, 21-40 and the empty 41-60; nothing after
        let requested: Vec<u32> = transport.requests().iter().map(|u| page_of(u)).collect();
        assert_eq!(requested.len(), 60);
        assert_eq!(requested.iter().max(), Some(&60));
    }

    #[tokio::test]
    async fn test_stops_on_batch_boundary() {
        let transport = Arc::new(failing_from(41));
        let fetcher = Fetcher::new(transport.clone());
        let paginator = Paginator::new(&fetcher, TEMPLATE, 20);

        let pages: Vec<String> = paginator.pages().collect().await;

        assert_eq!(pages.len(), 40);
        assert_eq!(transport.requests().len(), 60);
    }

    #[tokio::test]
    async fn test_no_pages_at_all() {
        let transport = Arc::new(failing_from(1));
        let fetcher = Fetcher::new(transport.clone());
        let paginator = Paginator::new(&fetcher, TEMPLATE, 5);

        let pages: Vec<String> = paginator.pages().collect().await;

        assert!(pages.is_empty());
        assert_eq!(transport.requests().len(), 5);
    }

    #[tokio::test]
    async fn test_partial_batch_keeps_going() {
        // page 2 fails alone, the walk continues past it
        let transport = Arc::new(MockTransport::new(|url| match page_of(url) {
            2 => status(url, 500),
            p if p <= 6 => ok(url, format!("page {}", p)),
            _ => status(url, 404),
        }));
        let fetcher = Fetcher::new(transport.clone());
        let paginator = Paginator::new(&fetcher, TEMPLATE, 3);

        let pages: Vec<String> = paginator.pages().collect().await;

        assert_eq!(pages, vec!["page 1", "page 3", "page 4", "page 5", "page 6"]);
        assert_eq!(transport.requests().len(), 9);
    }

    #[tokio::test]
    async fn test_batches_are_sequential() {
        let transport = Arc::new(failing_from(4));
        let fetcher = Fetcher::new(transport.clone());
        let paginator = Paginator::new(&fetcher, TEMPLATE, 2);
        let pages = paginator.pages();
        futures::pin_mut!(pages);

        assert_eq!(pages.next().await.as_deref(), Some("page 1"));
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(pages.next().await.as_deref(), Some("page 2"));
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(pages.next().await.as_deref(), Some("page 3"));
        assert_eq!(transport.requests().len(), 4);
    }
}
