//! API-side authorization guard.
//!
//! Enforces the permission check at the route boundary, keeping domain code
//! and stores auth-agnostic.

use axum::http::StatusCode;

use shopgrid_auth::{authorize, AuthzError, Permission, Principal, TenantMembership};

use crate::app::errors::json_error;
use crate::context::{PrincipalContext, TenantContext};

/// Check that the request's principal holds `permission` within its tenant.
/// Returns a ready-to-send error response on denial.
pub fn require(
    tenant: &TenantContext,
    principal: &PrincipalContext,
    permission: &'static str,
) -> Result<(), axum::response::Response> {
    let membership = TenantMembership::from_roles(tenant.tenant_id(), principal.roles().to_vec());
    let principal = Principal::new(principal.principal_id(), membership);

    authorize(&principal, &Permission::new(permission)).map_err(|e| match e {
        AuthzError::TenantMismatch => {
            json_error(StatusCode::FORBIDDEN, "tenant_isolation", e.to_string())
        }
        AuthzError::Forbidden(_) => json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()),
    })
}
