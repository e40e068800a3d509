//! Public directory endpoints: search, storefront lookup, related stores,
//! featured products, and the category taxonomy.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use shopgrid_directory::{listing_to_response, featured_to_response, SearchFilter, SortKey};
use shopgrid_infra::StoreError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

const DEFAULT_RELATED_LIMIT: usize = 5;
const MAX_RELATED_LIMIT: usize = 20;

pub fn router() -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/stores/:slug", get(get_store))
        .route("/stores/:slug/related", get(related))
        .route("/featured", get(featured))
        .route("/categories", get(categories))
}

pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::SearchParams>,
) -> axum::response::Response {
    let page = dto::page_request(params.page.as_deref(), params.limit.as_deref());
    let filter = SearchFilter::new(
        params.category,
        params.city,
        params.state,
        params.q,
        SortKey::from_raw(params.sort.as_deref()),
    );

    match services.directory.search(&filter, page).await {
        Ok((rows, pagination)) => {
            let items: Vec<_> = rows.into_iter().map(listing_to_response).collect();
            (StatusCode::OK, Json(dto::paged(items, pagination))).into_response()
        }
        Err(StoreError::Database(e)) => {
            tracing::error!(error = %e, "directory search failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "directory_search_failed",
                "search is temporarily unavailable",
            )
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_store(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> axum::response::Response {
    match services.directory.get_by_slug(&slug).await {
        Ok(row) => (StatusCode::OK, Json(listing_to_response(row))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn related(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
    Query(params): Query<dto::RelatedParams>,
) -> axum::response::Response {
    let limit = params
        .limit
        .as_deref()
        .and_then(|l| l.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_RELATED_LIMIT)
        .clamp(1, MAX_RELATED_LIMIT);

    match services.directory.related(&slug, limit).await {
        Ok(ranked) => {
            let items: Vec<_> = ranked
                .into_iter()
                .map(|r| {
                    json!({
                        "listing": listing_to_response(r.listing),
                        "score": r.score,
                        "categoryOverlap": r.category_overlap,
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn featured(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::FeaturedParams>,
) -> axum::response::Response {
    let point = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => Some((lat, lng)),
        (None, None) => None,
        _ => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "lat and lng must be provided together",
            );
        }
    };
    if let Some((lat, lng)) = point {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "lat/lng out of range",
            );
        }
    }

    let page = dto::page_request(params.page.as_deref(), params.limit.as_deref());

    match services
        .directory
        .featured(point, params.max_distance_km, page)
        .await
    {
        Ok(rows) => {
            let items: Vec<_> = rows.into_iter().map(featured_to_response).collect();
            (StatusCode::OK, Json(json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.directory.categories().await {
        Ok(list) => (StatusCode::OK, Json(json!({ "items": list }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
