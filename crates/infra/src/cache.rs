//! Process-local cache for computed featured-product pages.

use std::time::Duration;

use moka::sync::Cache;

use shopgrid_directory::{FeaturedPageKey, FeaturedProductRow, FEATURED_CACHE_TTL_SECS};

/// TTL cache of featured pages, keyed by coordinates + radius + page.
///
/// The sampling query uses SQL `random()`, so the cache is what keeps a page
/// stable while a visitor paginates. Entries expire after five minutes, at
/// which point the next request draws a fresh sample.
#[derive(Debug, Clone)]
pub struct FeaturedCache {
    inner: Cache<FeaturedPageKey, Vec<FeaturedProductRow>>,
}

impl FeaturedCache {
    pub fn new() -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(FEATURED_CACHE_TTL_SECS))
                .build(),
        }
    }

    pub fn get(&self, key: &FeaturedPageKey) -> Option<Vec<FeaturedProductRow>> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: FeaturedPageKey, rows: Vec<FeaturedProductRow>) {
        self.inner.insert(key, rows);
    }

    /// Drop all cached pages. Used by the admin refresh endpoint so a matview
    /// refresh is visible immediately.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

impl Default for FeaturedCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopgrid_core::PageRequest;

    #[test]
    fn cached_page_is_returned_until_invalidated() {
        let cache = FeaturedCache::new();
        let key = FeaturedPageKey::new(Some((30.27, -97.74)), Some(100.0), PageRequest::new(1, 20));

        assert!(cache.get(&key).is_none());
        cache.insert(key, Vec::new());
        assert_eq!(cache.get(&key), Some(Vec::new()));

        cache.invalidate_all();
        cache.inner.run_pending_tasks();
        assert!(cache.get(&key).is_none());
    }
}
