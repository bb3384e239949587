pub mod cache;
pub mod export;

pub use cache::ListingCache;
