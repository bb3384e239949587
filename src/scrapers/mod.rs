pub mod classify;
pub mod detail;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod list_am;
pub mod page;
pub mod paginate;
pub mod price;
pub mod traits;
pub mod types;

pub use filters::FilterSet;
pub use list_am::ListAmScraper;
pub use price::PriceNormalizer;
pub use traits::ListingScraper;
pub use types::{MalformedPagePolicy, MissingDatePolicy, ScrapePolicy, SearchParams, SiteConfig};
