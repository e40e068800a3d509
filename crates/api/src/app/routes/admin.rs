//! Platform-operator endpoints. All routes here require permissions only the
//! admin wildcard grants.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use shopgrid_core::TenantId;
use shopgrid_flags::FlagScope;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/flags", get(list_flags).put(persist_flag))
        .route("/flags/override", put(set_override))
        .route("/flags/effective", get(effective_flag))
        .route("/matviews/refresh", post(refresh_matviews))
        .route("/matviews/status", get(matview_status))
        .route("/tenants", get(list_tenants))
        .route("/tenants/:id", get(get_tenant))
}

pub async fn list_flags(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "flags.manage") {
        return resp;
    }

    let persisted = match services.flags.list_persisted().await {
        Ok(list) => list,
        Err(e) => return errors::store_error_to_response(e),
    };
    let overrides: Vec<_> = services
        .flags
        .overrides_snapshot()
        .into_iter()
        .map(|(flag, scope, value)| {
            json!({
                "flag": flag,
                "scope": scope,
                "value": value,
            })
        })
        .collect();

    (
        StatusCode::OK,
        Json(json!({ "persisted": persisted, "overrides": overrides })),
    )
        .into_response()
}

pub async fn persist_flag(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::PersistFlagRequest>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "flags.manage") {
        return resp;
    }

    match services
        .flags
        .set_persisted(&body.flag, body.tenant_id, body.enabled)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "flag": body.flag, "enabled": body.enabled })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn set_override(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::FlagOverrideRequest>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "flags.manage") {
        return resp;
    }

    let Some(value) = body.value else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "value is required; send null to clear the override",
        );
    };

    let scope = match body.tenant_id {
        Some(id) => FlagScope::Tenant(id),
        None => FlagScope::Platform,
    };
    services.flags.set_override(&body.flag, scope, value);

    (
        StatusCode::OK,
        Json(json!({
            "flag": body.flag,
            "scope": scope,
            "override": value,
        })),
    )
        .into_response()
}

pub async fn effective_flag(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<dto::EffectiveFlagParams>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "flags.manage") {
        return resp;
    }

    match services.flags.effective(&params.flag, params.tenant_id).await {
        Ok(flag) => (
            StatusCode::OK,
            Json(json!({ "flag": params.flag, "effective": flag })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn refresh_matviews(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "admin.matviews") {
        return resp;
    }

    match services.directory.refresh_views().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "refreshed": true }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn matview_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "admin.matviews") {
        return resp;
    }

    match services.directory.refresh_status().await {
        Ok(list) => (StatusCode::OK, Json(json!({ "items": list }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_tenants(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<dto::ListParams>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "tenants.list") {
        return resp;
    }

    let page = dto::page_request(params.page.as_deref(), params.limit.as_deref());
    match services.tenants.list(page).await {
        Ok((tenants, pagination)) => {
            (StatusCode::OK, Json(dto::paged(tenants, pagination))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&tenant, &principal, "tenants.list") {
        return resp;
    }
    let tenant_id: TenantId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid tenant id")
        }
    };

    match services.tenants.get(tenant_id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
