//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: infrastructure wiring (pool-backed stores, flag service)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Directory browsing and the Stripe webhook are public; everything else
/// requires a bearer token.
pub fn build_app(jwt_secret: String, webhook_secret: String, pool: sqlx::PgPool) -> Router {
    let jwt = Arc::new(shopgrid_auth::Hs256JwtValidator::new(
        jwt_secret.into_bytes(),
    ));
    let auth_state = middleware::AuthState { jwt };

    let services = Arc::new(services::build_services(pool, webhook_secret));

    let public = Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/directory", routes::directory::router())
        .route("/api/webhooks/stripe", post(routes::webhooks::stripe_webhook))
        .layer(Extension(services.clone()));

    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    public.merge(protected)
}
