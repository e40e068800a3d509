//! Request DTOs and JSON mapping helpers. The wire format is camelCase; the
//! domain stays snake_case.

use serde::Deserialize;
use serde_json::json;

use shopgrid_core::{CategoryId, PageRequest, Pagination, TenantId};
use shopgrid_orders::LineItemInput;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub name: String,
    pub subdomain: String,
    #[serde(default)]
    pub subscription_tier: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    pub subscription_tier: Option<String>,
    pub status: Option<String>,
    pub location_status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub stock_quantity: Option<i64>,
    pub status: Option<String>,
    pub visibility: Option<String>,
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    pub items: Vec<LineItemInput>,
    #[serde(default)]
    pub tax_cents: i64,
    #[serde(default)]
    pub shipping_cents: i64,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub stripe_payment_intent: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagOverrideRequest {
    pub flag: String,
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    /// `Some(Some(v))` sets, `Some(None)` (explicit `null`) clears, `None`
    /// (key absent) is rejected by the handler.
    #[serde(default, deserialize_with = "double_option")]
    pub value: Option<Option<bool>>,
}

/// Wraps the deserialized value so an absent key (outer `None`) stays
/// distinguishable from an explicit `null` (inner `None`).
fn double_option<'de, D>(de: D) -> Result<Option<Option<bool>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistFlagRequest {
    pub flag: String,
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    pub enabled: bool,
}

/// Query parameters for directory search. Everything is a string on the wire
/// so malformed values sanitize instead of failing extraction.
#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub max_distance_km: Option<f64>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RelatedParams {
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveFlagParams {
    pub flag: String,
    pub tenant_id: Option<TenantId>,
}

/// Sanitized page request from raw query strings.
pub fn page_request(page: Option<&str>, limit: Option<&str>) -> PageRequest {
    PageRequest::from_raw(page, limit)
}

/// Standard paged envelope.
pub fn paged<T: serde::Serialize>(items: Vec<T>, pagination: Pagination) -> serde_json::Value {
    json!({
        "items": items,
        "pagination": pagination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_override_distinguishes_null_from_an_absent_key() {
        let set: FlagOverrideRequest =
            serde_json::from_str(r#"{"flag":"checkout_v2","value":true}"#).unwrap();
        assert_eq!(set.value, Some(Some(true)));

        let clear: FlagOverrideRequest =
            serde_json::from_str(r#"{"flag":"checkout_v2","value":null}"#).unwrap();
        assert_eq!(clear.value, Some(None));

        let absent: FlagOverrideRequest =
            serde_json::from_str(r#"{"flag":"checkout_v2"}"#).unwrap();
        assert_eq!(absent.value, None);
    }
}
