//! Category taxonomy (GBP-mirrored).
//!
//! Categories are read-only here: the taxonomy is synced from Google Business
//! Profile data by an external job, and product counts come from the
//! `category_product_counts` materialized view.

use serde::{Deserialize, Serialize};

use shopgrid_core::CategoryId;

/// A category plus its precomputed product count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProductCount {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub product_count: i64,
}
