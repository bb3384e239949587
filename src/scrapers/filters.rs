use crate::models::Listing;
use std::collections::HashSet;

pub type Filter = Box<dyn Fn(&Listing) -> bool + Send + Sync>;

/// Predicates applied conjunctively; an empty set accepts everything.
#[derive(Default)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl Fn(&Listing) -> bool + Send + Sync + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn accepts(&self, listing: &Listing) -> bool {
        self.filters.iter().all(|f| f(listing))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Price present and within `[low, high]`
pub fn price_range(low: f64, high: f64) -> impl Fn(&Listing) -> bool + Send + Sync {
    move |listing| listing.price.is_some_and(|p| low <= p && p <= high)
}

pub fn has_thumbnail() -> impl Fn(&Listing) -> bool + Send + Sync {
    |listing| listing.thumbnail_url.is_some()
}

/// Rejects listings whose thumbnail address contains any of `fragments`.
/// Listings without a thumbnail pass.
pub fn thumbnail_excludes(fragments: Vec<String>) -> impl Fn(&Listing) -> bool + Send + Sync {
    move |listing| match &listing.thumbnail_url {
        Some(url) => !fragments.iter().any(|f| url.contains(f.as_str())),
        None => true,
    }
}

/// Accepts listings whose url is not in `seen`
pub fn unseen(seen: HashSet<String>) -> impl Fn(&Listing) -> bool + Send + Sync {
    move |listing| !seen.contains(&listing.url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: u32, price: Option<f64>, thumbnail: Option<&str>) -> Listing {
        let mut listing = Listing::new(format!("https://www.list.am/item/{}", id));
        listing.price = price;
        listing.thumbnail_url = thumbnail.map(str::to_string);
        listing
    }

    #[test]
    fn test_empty_set_accepts_all() {
        let filters = FilterSet::new();
        assert!(filters.is_empty());
        assert!(filters.accepts(&listing(1, None, None)));
    }

    #[test]
    fn test_price_range_inclusive() {
        let filter = price_range(100_000.0, 300_000.0);
        assert!(filter(&listing(1, Some(100_000.0), None)));
        assert!(filter(&listing(1, Some(300_000.0), None)));
        assert!(!filter(&listing(1, Some(99_999.0), None)));
        assert!(!filter(&listing(1, None, None)));
    }

    #[test]
    fn test_thumbnail_excludes() {
        let filter = thumbnail_excludes(vec!["promo".to_string(), "/banner/".to_string()]);
        assert!(filter(&listing(1, None, Some("//s.list.am/r/1.webp"))));
        assert!(!filter(&listing(2, None, Some("//s.list.am/promo/2.webp"))));
        assert!(filter(&listing(3, None, None)));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let seen: HashSet<String> = ["https://www.list.am/item/2".to_string()].into();
        let filters = FilterSet::new()
            .with(price_range(100_000.0, 300_000.0))
            .with(has_thumbnail())
            .with(unseen(seen));
        assert_eq!(filters.len(), 3);

        assert!(filters.accepts(&listing(1, Some(150_000.0), Some("/t.jpg"))));
        // seen before
        assert!(!filters.accepts(&listing(2, Some(150_000.0), Some("/t.jpg"))));
        assert!(!filters.accepts(&listing(3, Some(150_000.0), None)));
        assert!(!filters.accepts(&listing(4, Some(50_000.0), Some("/t.jpg"))));
    }
}
