//! Page/limit handling shared by every paged read endpoint.

use serde::{Deserialize, Serialize};

/// Hard cap on page size for all list endpoints.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// A sanitized page request.
///
/// Malformed or out-of-range values never fail the request: `page` falls back
/// to 1 and `limit` is clamped into `[1, MAX_PAGE_LIMIT]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Sanitize raw query-string values into a usable page request.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let limit = limit
            .and_then(|l| l.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);

        Self { page, limit }
    }

    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// SQL OFFSET for this page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

/// Pagination envelope returned alongside every page of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl Pagination {
    /// Build the envelope. `total_pages` is `ceil(total_items / limit)`.
    pub fn new(req: PageRequest, total_items: u64) -> Self {
        let limit = u64::from(req.limit());
        let total_pages = total_items.div_ceil(limit);
        Self {
            page: req.page(),
            limit: req.limit(),
            total_items,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn malformed_page_defaults_to_one() {
        let req = PageRequest::from_raw(Some("abc"), Some("10"));
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 10);

        let req = PageRequest::from_raw(Some("0"), None);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), DEFAULT_PAGE_LIMIT);

        let req = PageRequest::from_raw(Some("-3"), Some("1"));
        assert_eq!(req.page(), 1);
    }

    #[test]
    fn limit_is_clamped_to_maximum() {
        let req = PageRequest::from_raw(None, Some("5000"));
        assert_eq!(req.limit(), MAX_PAGE_LIMIT);

        let req = PageRequest::from_raw(None, Some("0"));
        assert_eq!(req.limit(), 1);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageRequest::new(1, 20).offset(), 0);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
    }

    #[test]
    fn envelope_for_empty_result_has_zero_pages() {
        let env = Pagination::new(PageRequest::new(1, 20), 0);
        assert_eq!(env.total_pages, 0);
        assert_eq!(env.total_items, 0);
    }

    proptest! {
        #[test]
        fn total_pages_is_ceiling_of_items_over_limit(
            page in 1u32..10_000,
            limit in 1u32..=MAX_PAGE_LIMIT,
            total_items in 0u64..10_000_000,
        ) {
            let env = Pagination::new(PageRequest::new(page, limit), total_items);
            let expected = total_items.div_ceil(u64::from(env.limit));
            prop_assert_eq!(env.total_pages, expected);
            // Every fully-preceding page is full, so the envelope never
            // claims more pages than items (unless empty).
            if total_items > 0 {
                prop_assert!(env.total_pages >= 1);
                prop_assert!((env.total_pages - 1) * u64::from(env.limit) < total_items);
            }
        }
    }
}
