//! Bearer-token middleware: verifies the JWT and promotes its claims into the
//! per-request [`TenantContext`] and [`PrincipalContext`].
//!
//! Rejections use the platform error body so clients can distinguish a
//! missing header from a bad or expired token.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use shopgrid_auth::{JwtError, JwtValidator, TokenValidationError};

use crate::app::errors::json_error;
use crate::context::{PrincipalContext, TenantContext};

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()) else {
        return json_error(
            StatusCode::UNAUTHORIZED,
            "missing_token",
            "a bearer token is required",
        );
    };

    let claims = match state.jwt.validate(token, Utc::now()) {
        Ok(claims) => claims,
        Err(e) => return rejected(e),
    };

    req.extensions_mut()
        .insert(TenantContext::new(claims.tenant_id));
    req.extensions_mut()
        .insert(PrincipalContext::new(claims.sub, claims.roles));

    next.run(req).await
}

fn rejected(err: JwtError) -> Response {
    let code = match err {
        JwtError::Claims(TokenValidationError::Expired) => "token_expired",
        _ => "invalid_token",
    };
    tracing::debug!(error = %err, "rejected bearer token");
    json_error(StatusCode::UNAUTHORIZED, code, "token rejected")
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
