use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use shopgrid_catalog::{ItemStatus, ItemVisibility, NewItem};
use shopgrid_core::ItemId;
use shopgrid_infra::ItemUpdate;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/:id",
            get(get_item).patch(update_item).delete(archive_item),
        )
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "inventory.items.create") {
        return resp;
    }

    let item = match NewItem::parse(
        &body.sku,
        &body.name,
        body.description,
        body.price_cents,
        body.stock_quantity,
        body.category_id,
    ) {
        Ok(i) => i,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.catalog.create(tenant.tenant_id(), item).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<dto::ListParams>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "inventory.items.read") {
        return resp;
    }

    let status = match params.status.as_deref() {
        Some(raw) => match ItemStatus::parse(raw) {
            Ok(s) => Some(s),
            Err(e) => return errors::domain_error_to_response(e),
        },
        None => None,
    };
    let page = dto::page_request(params.page.as_deref(), params.limit.as_deref());

    match services.catalog.list(tenant.tenant_id(), status, page).await {
        Ok((items, pagination)) => {
            (StatusCode::OK, Json(dto::paged(items, pagination))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "inventory.items.read") {
        return resp;
    }
    let item_id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id")
        }
    };

    match services.catalog.get(tenant.tenant_id(), item_id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateItemRequest>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "inventory.items.update") {
        return resp;
    }
    let item_id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id")
        }
    };

    if let Some(price) = body.price_cents {
        if price < 0 {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "price_cents must not be negative",
            );
        }
    }
    if let Some(stock) = body.stock_quantity {
        if stock < 0 {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "stock_quantity must not be negative",
            );
        }
    }

    let status = match body.status.as_deref() {
        Some(raw) => match ItemStatus::parse(raw) {
            Ok(s) => Some(s),
            Err(e) => return errors::domain_error_to_response(e),
        },
        None => None,
    };
    let visibility = match body.visibility.as_deref() {
        Some(raw) => match ItemVisibility::parse(raw) {
            Ok(v) => Some(v),
            Err(e) => return errors::domain_error_to_response(e),
        },
        None => None,
    };

    let update = ItemUpdate {
        name: body.name,
        description: body.description,
        price_cents: body.price_cents,
        stock_quantity: body.stock_quantity,
        status,
        visibility,
        category_id: body.category_id,
    };

    match services
        .catalog
        .update(tenant.tenant_id(), item_id, update)
        .await
    {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn archive_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "inventory.items.update") {
        return resp;
    }
    let item_id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id")
        }
    };

    match services.catalog.archive(tenant.tenant_id(), item_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "id": item_id.to_string(), "archived": true })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
