#[tokio::main]
async fn main() {
    shopgrid_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });
    let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_else(|_| {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set; using insecure dev default");
        "whsec_dev".to_string()
    });
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let db_config = shopgrid_infra::DbConfig::from_env();
    let pool = shopgrid_infra::connect_pool(&db_config);

    let app = shopgrid_api::app::build_app(jwt_secret, webhook_secret, pool);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
