//! `shopgrid-directory` — directory search/ranking domain.
//!
//! Everything here is pure: SQL text + parameter building, in-process
//! scoring, and response shaping. Execution lives in `shopgrid-infra`.

pub mod featured;
pub mod model;
pub mod related;
pub mod search;
pub mod transform;

pub use featured::{distance_band_multiplier, FeaturedPageKey, FeaturedQuery, FEATURED_CACHE_TTL_SECS};
pub use model::{FeaturedProductRow, ListingRow};
pub use related::{rank_related, RelatedListing};
pub use search::{SearchFilter, SearchQuery, SortKey};
pub use transform::{featured_to_response, listing_to_response, FeaturedProductResponse, ListingResponse};
