use axum::{routing::get, Router};

pub mod admin;
pub mod directory;
pub mod gdpr;
pub mod inventory;
pub mod orders;
pub mod system;
pub mod tenants;
pub mod webhooks;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/api/whoami", get(system::whoami))
        .nest("/api/tenants", tenants::router())
        .nest("/api/inventory", inventory::router())
        .nest("/api/orders", orders::router())
        .nest("/api/gdpr", gdpr::router())
        .nest("/api/admin", admin::router())
}
