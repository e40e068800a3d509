//! Connection pool provider.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Pool configuration read from the environment by the API bootstrap.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            tracing::warn!("DATABASE_URL not set; using local dev default");
            "postgres://localhost/shopgrid_dev".to_string()
        });
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        Self {
            database_url,
            max_connections,
        }
    }
}

/// Build the shared pool.
///
/// Connections are established lazily: the process starts (and the router can
/// be exercised) before the database is reachable, and the first query pays
/// the connection cost.
pub fn connect_pool(config: &DbConfig) -> PgPool {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy(&config.database_url)
        .expect("invalid DATABASE_URL")
}
