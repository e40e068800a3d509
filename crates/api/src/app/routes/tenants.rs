use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use shopgrid_infra::TenantUpdate;
use shopgrid_tenants::{LocationStatus, NewTenant, SubscriptionTier, TenantStatus};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_tenant))
        .route("/me", get(get_me).patch(update_me))
}

/// Platform-operator endpoint: provision a new tenant.
pub async fn create_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateTenantRequest>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "tenants.create") {
        return resp;
    }

    let tier = match body.subscription_tier.as_deref() {
        Some(raw) => match SubscriptionTier::parse(raw) {
            Ok(t) => t,
            Err(e) => return errors::domain_error_to_response(e),
        },
        None => SubscriptionTier::Free,
    };

    let new_tenant = match NewTenant::parse(&body.name, &body.subdomain, tier) {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.tenants.create(new_tenant).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "tenants.read") {
        return resp;
    }

    match services.tenants.get(tenant.tenant_id()).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::UpdateTenantRequest>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "tenants.update") {
        return resp;
    }

    let update = match parse_update(body) {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    match services.tenants.update(tenant.tenant_id(), update).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn parse_update(body: dto::UpdateTenantRequest) -> Result<TenantUpdate, axum::response::Response> {
    let subscription_tier = body
        .subscription_tier
        .as_deref()
        .map(SubscriptionTier::parse)
        .transpose()
        .map_err(errors::domain_error_to_response)?;
    let status = body
        .status
        .as_deref()
        .map(TenantStatus::parse)
        .transpose()
        .map_err(errors::domain_error_to_response)?;
    let location_status = body
        .location_status
        .as_deref()
        .map(LocationStatus::parse)
        .transpose()
        .map_err(errors::domain_error_to_response)?;

    Ok(TenantUpdate {
        name: body.name,
        subscription_tier,
        status,
        location_status,
    })
}
