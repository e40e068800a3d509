use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/export", get(export))
        .route("/erase", post(erase))
}

pub async fn export(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "gdpr.export") {
        return resp;
    }

    match services.tenants.gdpr_export(tenant.tenant_id()).await {
        Ok(bundle) => (StatusCode::OK, Json(bundle)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn erase(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "gdpr.erase") {
        return resp;
    }

    tracing::info!(tenant_id = %tenant.tenant_id(), "gdpr erasure requested");
    let actor = principal.principal_id().to_string();
    match services.tenants.gdpr_erase(tenant.tenant_id(), &actor).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
