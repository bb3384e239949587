//! Concurrent page fetching.
//!
//! [`Fetcher::fetch_all`] issues one request per url and waits for all of
//! them. A slot stays `None` on a non-2xx status, on a redirect away from the
//! requested address, or on a transport error; none of these abort the batch.

use crate::scrapers::error::ScrapeError;
use crate::scrapers::types::SiteConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header::{HeaderMap, HeaderValue, HOST};
use reqwest::{Client, Url};
use std::sync::Arc;
use tracing::{debug, warn};

/// Raw response of a single GET
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    /// Address the body was served from, after redirects
    pub final_url: String,
    pub body: String,
}

/// Something that can GET a url
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse>;
}

/// reqwest-backed transport sending the site's Host and User-Agent headers
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(site: &SiteConfig) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_str(&site.host)?);

        let client = Client::builder()
            .user_agent(site.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;

        Ok(FetchResponse {
            status,
            final_url,
            body,
        })
    }
}

#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// One slot per input url, in input order.
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<Option<String>> {
        join_all(urls.iter().map(|url| self.fetch_one(url))).await
    }

    async fn fetch_one(&self, url: &str) -> Option<String> {
        let response = match self.transport.get(url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("{:#}", e);
                return None;
            }
        };

        if !(200..300).contains(&response.status) {
            debug!("{} returned status {}", url, response.status);
            return None;
        }
        if !same_address(url, &response.final_url) {
            debug!("{} redirected to {}", url, response.final_url);
            return None;
        }

        Some(response.body)
    }
}

/// Compares addresses after url normalization, falling back to the raw text
fn same_address(requested: &str, served: &str) -> bool {
    match (Url::parse(requested), Url::parse(served)) {
        (Ok(a), Ok(b)) => a == b,
        _ => requested == served,
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{ok, status, MockTransport};
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://t.test/page/{}", i)).collect()
    }

    fn index_of(url: &str) -> u64 {
        url.rsplit('/').next().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_preserves_input_order() {
        // later urls answer first
        let transport = MockTransport::new(|url| ok(url, url))
            .with_delay(|url| Duration::from_millis(50 - 10 * index_of(url)));
        let fetcher = Fetcher::new(Arc::new(transport));

        let input = urls(5);
        let bodies = fetcher.fetch_all(&input).await;

        let expected: Vec<Option<String>> = input.iter().cloned().map(Some).collect();
        assert_eq!(bodies, expected);
    }

    #[tokio::test]
    async fn test_failures_leave_empty_slots() {
        let transport = MockTransport::new(|url| match index_of(url) {
            0 => ok(url, "zero"),
            1 => status(url, 404),
            2 => anyhow::bail!("connection reset"),
            3 => ok("https://t.test/login", "redirected"),
            _ => ok(url, "four"),
        });
        let fetcher = Fetcher::new(Arc::new(transport));

        let bodies = fetcher.fetch_all(&urls(5)).await;

        assert_eq!(
            bodies,
            vec![Some("zero".to_string()), None, None, None, Some("four".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let transport = Arc::new(MockTransport::new(|url| ok(url, "")));
        let fetcher = Fetcher::new(transport.clone());

        assert!(fetcher.fetch_all(&[]).await.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_same_address_normalizes() {
        assert!(same_address("https://www.list.am/item/1", "https://www.list.am/item/1"));
        assert!(same_address("https://WWW.list.am/item/1", "https://www.list.am/item/1"));
        assert!(!same_address("https://www.list.am/item/1", "https://www.list.am/"));
    }

    #[tokio::test]
    async fn test_http_transport_against_server() {
        let server = MockServer::start().await;
        let site = SiteConfig {
            origin: server.uri(),
            ..SiteConfig::default()
        };
        // only answers requests carrying the site's identity headers
        Mock::given(method("GET"))
            .and(path("/category/56/1"))
            .and(header("host", site.host.as_str()))
            .and(header("user-agent", site.user_agent.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>page</html>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/category/56/2"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/category/56/3"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", format!("{}/", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("home"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(Arc::new(HttpTransport::new(&site).unwrap()));

        let input: Vec<String> = (1..=3)
            .map(|p| format!("{}/category/56/{}", server.uri(), p))
            .collect();
        let bodies = fetcher.fetch_all(&input).await;

        assert_eq!(bodies, vec![Some("<html>page</html>".to_string()), None, None]);
    }
}
