//! Row shapes read from the materialized views.
//!
//! These mirror the snake_case view columns; `transform` turns them into the
//! camelCase API shape. Infra maps sqlx rows into these structs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopgrid_core::TenantId;

/// One row of the `directory_listings` materialized view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRow {
    pub tenant_id: TenantId,
    pub store_name: String,
    pub slug: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub primary_category: Option<String>,
    pub secondary_category: Option<String>,
    pub rating_avg: Option<f64>,
    pub rating_count: i64,
    pub product_count: i64,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

/// One row of the `featured_products` materialized view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedProductRow {
    pub item_id: uuid::Uuid,
    pub tenant_id: TenantId,
    pub store_name: String,
    pub store_slug: String,
    pub product_name: String,
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
