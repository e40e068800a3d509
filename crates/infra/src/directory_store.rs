//! Read-side store over the directory materialized views.
//!
//! Search and featured sampling execute SQL built by `shopgrid-directory`;
//! related-store ranking pulls a bounded candidate pool and scores it in
//! process.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use shopgrid_catalog::CategoryProductCount;
use shopgrid_core::{CategoryId, PageRequest, Pagination, TenantId};
use shopgrid_directory::{
    rank_related, FeaturedPageKey, FeaturedProductRow, FeaturedQuery, ListingRow, RelatedListing,
    SearchFilter, SearchQuery,
};

use crate::cache::FeaturedCache;
use crate::error::StoreError;

/// How many candidates related-store ranking considers per request.
const RELATED_POOL_LIMIT: i64 = 200;

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    pool: PgPool,
    featured_cache: FeaturedCache,
}

impl DirectoryStore {
    pub fn new(pool: PgPool, featured_cache: FeaturedCache) -> Self {
        Self {
            pool,
            featured_cache,
        }
    }

    /// Paged directory search.
    pub async fn search(
        &self,
        filter: &SearchFilter,
        page: PageRequest,
    ) -> Result<(Vec<ListingRow>, Pagination), StoreError> {
        let query = SearchQuery::build(filter);

        let mut count = sqlx::query(&query.count_sql);
        for param in &query.params {
            count = count.bind(param);
        }
        let total: i64 = count.fetch_one(&self.pool).await?.try_get(0)?;

        let mut select = sqlx::query(&query.sql);
        for param in &query.params {
            select = select.bind(param);
        }
        let rows = select
            .bind(i64::from(page.limit()))
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let listings = rows
            .iter()
            .map(listing_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((listings, Pagination::new(page, total.max(0) as u64)))
    }

    /// Single listing by storefront slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<ListingRow, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM directory_listings WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(listing_from_row(&row)?)
    }

    /// Related stores for a listing: candidates sharing a category or the
    /// source's state, ranked in process.
    pub async fn related(&self, slug: &str, limit: usize) -> Result<Vec<RelatedListing>, StoreError> {
        let source = self.get_by_slug(slug).await?;

        let rows = sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM directory_listings \
             WHERE tenant_id <> $1 \
               AND (LOWER(state) = LOWER(COALESCE($2, '')) \
                 OR primary_category IN ($3, $4) \
                 OR secondary_category IN ($3, $4)) \
             LIMIT $5"
        ))
        .bind(source.tenant_id.as_uuid())
        .bind(&source.state)
        .bind(&source.primary_category)
        .bind(&source.secondary_category)
        .bind(RELATED_POOL_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let pool: Vec<ListingRow> = rows
            .iter()
            .map(listing_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rank_related(&source, &pool, limit))
    }

    /// Proximity-weighted featured page, served from the TTL cache when warm.
    pub async fn featured(
        &self,
        point: Option<(f64, f64)>,
        max_distance_km: Option<f64>,
        page: PageRequest,
    ) -> Result<Vec<FeaturedProductRow>, StoreError> {
        let key = FeaturedPageKey::new(point, max_distance_km, page);
        if let Some(cached) = self.featured_cache.get(&key) {
            return Ok(cached);
        }

        let query = FeaturedQuery::build(point, max_distance_km);
        let mut select = sqlx::query(&query.sql);
        if let Some((lat, lng, max_km)) = query.point {
            select = select.bind(lat).bind(lng).bind(max_km);
        }
        let rows = select
            .bind(i64::from(page.limit()))
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let products = rows
            .iter()
            .map(featured_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        self.featured_cache.insert(key, products.clone());
        Ok(products)
    }

    /// Category taxonomy with precomputed product counts.
    pub async fn categories(&self) -> Result<Vec<CategoryProductCount>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, slug, name, parent_id, product_count \
             FROM category_product_counts ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CategoryProductCount {
                    id: CategoryId::from_uuid(row.try_get::<Uuid, _>("id")?),
                    slug: row.try_get("slug")?,
                    name: row.try_get("name")?,
                    parent_id: row
                        .try_get::<Option<Uuid>, _>("parent_id")?
                        .map(CategoryId::from_uuid),
                    product_count: row.try_get("product_count")?,
                })
            })
            .collect()
    }

    /// Refresh the directory materialized views and log the refresh.
    ///
    /// CONCURRENTLY keeps reads available; the views must carry a unique
    /// index for that to be legal.
    pub async fn refresh_views(&self) -> Result<(), StoreError> {
        for view in [
            "directory_listings",
            "featured_products",
            "category_product_counts",
        ] {
            let started = Utc::now();
            sqlx::query(&format!("REFRESH MATERIALIZED VIEW CONCURRENTLY {view}"))
                .execute(&self.pool)
                .await?;
            sqlx::query(
                "INSERT INTO matview_refresh_log (view_name, started_at, finished_at) \
                 VALUES ($1, $2, $3)",
            )
            .bind(view)
            .bind(started)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        }
        self.featured_cache.invalidate_all();
        Ok(())
    }

    /// Most recent refresh per view, for the admin status endpoint.
    pub async fn refresh_status(&self) -> Result<Vec<ViewRefresh>, StoreError> {
        let rows = sqlx::query(
            "SELECT DISTINCT ON (view_name) view_name, started_at, finished_at \
             FROM matview_refresh_log ORDER BY view_name, finished_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ViewRefresh {
                    view_name: row.try_get("view_name")?,
                    started_at: row.try_get("started_at")?,
                    finished_at: row.try_get("finished_at")?,
                })
            })
            .collect()
    }
}

/// Latest refresh record for one materialized view.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRefresh {
    pub view_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

const LISTING_COLUMNS: &str = "tenant_id, store_name, slug, description, address, city, state, \
     latitude, longitude, primary_category, secondary_category, \
     rating_avg, rating_count, product_count, is_featured, created_at";

fn listing_from_row(row: &PgRow) -> Result<ListingRow, sqlx::Error> {
    Ok(ListingRow {
        tenant_id: TenantId::from_uuid(row.try_get::<Uuid, _>("tenant_id")?),
        store_name: row.try_get("store_name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        primary_category: row.try_get("primary_category")?,
        secondary_category: row.try_get("secondary_category")?,
        rating_avg: row.try_get("rating_avg")?,
        rating_count: row.try_get("rating_count")?,
        product_count: row.try_get("product_count")?,
        is_featured: row.try_get("is_featured")?,
        created_at: row.try_get("created_at")?,
    })
}

fn featured_from_row(row: &PgRow) -> Result<FeaturedProductRow, sqlx::Error> {
    Ok(FeaturedProductRow {
        item_id: row.try_get("item_id")?,
        tenant_id: TenantId::from_uuid(row.try_get::<Uuid, _>("tenant_id")?),
        store_name: row.try_get("store_name")?,
        store_slug: row.try_get("store_slug")?,
        product_name: row.try_get("product_name")?,
        price_cents: row.try_get("price_cents")?,
        image_url: row.try_get("image_url")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
    })
}
