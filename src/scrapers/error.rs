use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A detail link opened while another listing's element was still open.
    #[error("listing {url} starts inside another listing ({depth} tags open)")]
    NestedListing { url: String, depth: usize },

    #[error("detail page {url} has no posting date")]
    MissingPostingDate { url: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}
