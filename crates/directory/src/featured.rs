//! Proximity-weighted featured product sampling.
//!
//! With coordinates, each row gets a distance-band multiplier times a uniform
//! random draw and the page is the ascending head of that weighted ordering:
//! nearby rows are favored without deterministically excluding far ones.
//! Without coordinates the sampler degrades to uniform random order.

use shopgrid_core::PageRequest;

/// How long a computed featured page stays cached.
pub const FEATURED_CACHE_TTL_SECS: u64 = 300;

/// Default search radius when the caller provides none.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 500.0;

/// Distance-band multiplier applied to the random draw. Lower means more
/// likely to be sampled (ordering is ascending).
pub fn distance_band_multiplier(distance_km: f64) -> f64 {
    if distance_km < 50.0 {
        0.1
    } else if distance_km < 100.0 {
        0.3
    } else if distance_km < 200.0 {
        0.5
    } else {
        1.0
    }
}

const FEATURED_COLUMNS: &str = "item_id, tenant_id, store_name, store_slug, product_name, \
     price_cents, image_url, latitude, longitude";

/// Haversine great-circle distance from the bound `$1`/`$2` point, in km.
const DISTANCE_EXPR: &str = "6371.0 * 2.0 * asin(sqrt( \
     power(sin(radians(latitude - $1) / 2.0), 2) + \
     cos(radians($1)) * cos(radians(latitude)) * \
     power(sin(radians(longitude - $2) / 2.0), 2)))";

/// A ready-to-execute featured-products query.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturedQuery {
    pub sql: String,
    /// `Some((lat, lng, max_distance_km))` when proximity weighting applies.
    pub point: Option<(f64, f64, f64)>,
}

impl FeaturedQuery {
    /// Build the sampling query. `limit`/`offset` are the final two bind
    /// parameters; with a point, `$1`=lat, `$2`=lng, `$3`=max distance km.
    pub fn build(point: Option<(f64, f64)>, max_distance_km: Option<f64>) -> Self {
        match point {
            Some((lat, lng)) => {
                let max_km = max_distance_km.unwrap_or(DEFAULT_MAX_DISTANCE_KM);
                let sql = format!(
                    "SELECT {FEATURED_COLUMNS} FROM ( \
                       SELECT {FEATURED_COLUMNS}, {DISTANCE_EXPR} AS distance_km \
                       FROM featured_products \
                       WHERE latitude IS NOT NULL AND longitude IS NOT NULL \
                     ) d WHERE distance_km <= $3 \
                     ORDER BY (CASE \
                       WHEN distance_km < 50 THEN 0.1 \
                       WHEN distance_km < 100 THEN 0.3 \
                       WHEN distance_km < 200 THEN 0.5 \
                       ELSE 1.0 END) * random() ASC \
                     LIMIT $4 OFFSET $5"
                );
                Self {
                    sql,
                    point: Some((lat, lng, max_km)),
                }
            }
            None => Self {
                sql: format!(
                    "SELECT {FEATURED_COLUMNS} FROM featured_products \
                     ORDER BY random() LIMIT $1 OFFSET $2"
                ),
                point: None,
            },
        }
    }
}

/// Cache key for a computed featured page.
///
/// Coordinates are keyed at microdegree precision (≈0.1 m), which makes the
/// key hashable without losing meaningful cache hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeaturedPageKey {
    lat_microdeg: Option<i64>,
    lng_microdeg: Option<i64>,
    max_distance_decimeters: Option<i64>,
    page: u32,
    limit: u32,
}

impl FeaturedPageKey {
    pub fn new(point: Option<(f64, f64)>, max_distance_km: Option<f64>, page: PageRequest) -> Self {
        Self {
            lat_microdeg: point.map(|(lat, _)| (lat * 1e6).round() as i64),
            lng_microdeg: point.map(|(_, lng)| (lng * 1e6).round() as i64),
            max_distance_decimeters: max_distance_km.map(|d| (d * 10_000.0).round() as i64),
            page: page.page(),
            limit: page.limit(),
        }
    }
}
