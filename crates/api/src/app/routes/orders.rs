use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shopgrid_core::OrderId;
use shopgrid_infra::NewOrder;
use shopgrid_orders::{compute_totals, OrderStatus};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order))
        .route("/:id/status", post(update_status))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "orders.create") {
        return resp;
    }

    let totals = match compute_totals(
        &body.items,
        body.tax_cents,
        body.shipping_cents,
        body.discount_cents,
    ) {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let order = NewOrder {
        customer_email: body.customer_email,
        customer_name: body.customer_name,
        shipping_address: body.shipping_address,
        items: body.items,
        stripe_payment_intent: body.stripe_payment_intent,
    };

    match services.orders.create(tenant.tenant_id(), order, totals).await {
        Ok(details) => (StatusCode::CREATED, Json(details)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<dto::ListParams>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "orders.read") {
        return resp;
    }

    let status = match params.status.as_deref() {
        Some(raw) => match OrderStatus::parse(raw) {
            Ok(s) => Some(s),
            Err(e) => return errors::domain_error_to_response(e),
        },
        None => None,
    };
    let page = dto::page_request(params.page.as_deref(), params.limit.as_deref());

    match services.orders.list(tenant.tenant_id(), status, page).await {
        Ok((orders, pagination)) => {
            (StatusCode::OK, Json(dto::paged(orders, pagination))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "orders.read") {
        return resp;
    }
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id")
        }
    };

    match services.orders.get(tenant.tenant_id(), order_id).await {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateOrderStatusRequest>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "orders.update") {
        return resp;
    }
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id")
        }
    };
    let to = match OrderStatus::parse(&body.status) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let actor = principal.principal_id().to_string();
    match services
        .orders
        .update_status(tenant.tenant_id(), order_id, to, &actor, body.reason)
        .await
    {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
