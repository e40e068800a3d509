//! View-row → API-response shaping.
//!
//! The materialized views speak snake_case with NULLs; the API speaks
//! camelCase with defaults filled in. This is the single place that mapping
//! happens.

use serde::Serialize;

use crate::model::{FeaturedProductRow, ListingRow};

/// Public directory listing as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub tenant_id: String,
    pub store_name: String,
    pub slug: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub primary_category: Option<String>,
    pub secondary_category: Option<String>,
    pub rating_avg: f64,
    pub rating_count: i64,
    pub product_count: i64,
    pub is_featured: bool,
    pub created_at: String,
}

/// Map a view row to the response shape, defaulting NULL text to empty
/// strings and NULL ratings to zero. Coordinates stay optional: there is no
/// meaningful default location.
pub fn listing_to_response(row: ListingRow) -> ListingResponse {
    ListingResponse {
        tenant_id: row.tenant_id.to_string(),
        store_name: row.store_name,
        slug: row.slug,
        description: row.description.unwrap_or_default(),
        address: row.address.unwrap_or_default(),
        city: row.city.unwrap_or_default(),
        state: row.state.unwrap_or_default(),
        latitude: row.latitude,
        longitude: row.longitude,
        primary_category: row.primary_category,
        secondary_category: row.secondary_category,
        rating_avg: row.rating_avg.unwrap_or(0.0),
        rating_count: row.rating_count,
        product_count: row.product_count,
        is_featured: row.is_featured,
        created_at: row.created_at.to_rfc3339(),
    }
}

/// Featured product as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedProductResponse {
    pub item_id: String,
    pub tenant_id: String,
    pub store_name: String,
    pub store_slug: String,
    pub product_name: String,
    pub price_cents: i64,
    pub image_url: String,
}

pub fn featured_to_response(row: FeaturedProductRow) -> FeaturedProductResponse {
    FeaturedProductResponse {
        item_id: row.item_id.to_string(),
        tenant_id: row.tenant_id.to_string(),
        store_name: row.store_name,
        store_slug: row.store_slug,
        product_name: row.product_name,
        price_cents: row.price_cents,
        image_url: row.image_url.unwrap_or_default(),
    }
}
