use serde::{Deserialize, Serialize};

/// Markup markers that tie text fragments to listing fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingMarkers {
    /// Class of the innermost price container
    pub price_class: String,
    /// Class of the summary line container ("3 սեն, 75 ք.մ.")
    pub summary_class: String,
    /// Exact inline text that flags an agency posting
    pub agency_word: String,
    /// Lazy-load attribute carrying the thumbnail address
    pub thumbnail_attr: String,
}

impl Default for ListingMarkers {
    fn default() -> Self {
        Self {
            price_class: "p".to_string(),
            summary_class: "at".to_string(),
            agency_word: "Գործակալություն".to_string(),
            thumbnail_attr: "data-original".to_string(),
        }
    }
}

/// Target site description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host every relative link is joined to
    pub origin: String,
    /// Value of the Host header sent with every request
    pub host: String,
    pub user_agent: String,
    /// Path prefix of detail-page links on results pages
    pub detail_prefix: String,
    pub markers: ListingMarkers,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "https://www.list.am".to_string(),
            host: "www.list.am".to_string(),
            user_agent: "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:97.0) Gecko/20100101 Firefox/97.0"
                .to_string(),
            detail_prefix: "/item".to_string(),
            markers: ListingMarkers::default(),
        }
    }
}

/// Search parameters for the results pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Category id (56 = apartments for rent)
    pub category: u32,
    /// Area code passed through as `n`
    pub area_code: u32,
    /// Billing frequency flag (`pfreq`)
    pub frequency: u32,
    /// Gallery layout flag (`gl`)
    pub layout: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            category: 56,
            area_code: 8,
            frequency: 1,
            layout: 2,
        }
    }
}

impl SearchParams {
    /// Absolute url template with a `{page}` placeholder
    pub fn url_template(&self, site: &SiteConfig) -> String {
        format!(
            "{}/category/{}/{{page}}?pfreq={}&n={}&gl={}",
            site.origin, self.category, self.frequency, self.area_code, self.layout
        )
    }
}

/// What to do with a results page whose markup opens a listing inside another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPagePolicy {
    #[default]
    Abort,
    SkipPage,
}

/// What to do with a listing whose detail page has no posting date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingDatePolicy {
    #[default]
    Keep,
    Drop,
    Fail,
}

/// Batching and failure policy for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapePolicy {
    /// Results pages requested concurrently per batch
    pub batch_size: u32,
    /// Detail pages requested concurrently per chunk
    pub detail_chunk_size: usize,
    pub on_malformed_page: MalformedPagePolicy,
    pub on_missing_posting_date: MissingDatePolicy,
}

impl Default for ScrapePolicy {
    fn default() -> Self {
        Self {
            batch_size: 20,
            detail_chunk_size: 20,
            on_malformed_page: MalformedPagePolicy::default(),
            on_missing_posting_date: MissingDatePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template() {
        let template = SearchParams::default().url_template(&SiteConfig::default());
        assert_eq!(
            template,
            "https://www.list.am/category/56/{page}?pfreq=1&n=8&gl=2"
        );
    }

    #[test]
    fn test_policy_names() {
        let policy: MissingDatePolicy = serde_json::from_str("\"drop\"").unwrap();
        assert_eq!(policy, MissingDatePolicy::Drop);
        let policy: MalformedPagePolicy = serde_json::from_str("\"skip_page\"").unwrap();
        assert_eq!(policy, MalformedPagePolicy::SkipPage);
    }
}
