//! Black-box tests over the real router on an ephemeral port.
//!
//! The pool connects lazily, so these tests cover the paths that never reach
//! the database: health, auth/authz gating, input validation, webhook
//! signature checks, and the in-memory flag overrides.

use chrono::{Duration as ChronoDuration, Utc};
use hmac::{Hmac, Mac};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;
use sha2::Sha256;

use shopgrid_auth::{JwtClaims, PrincipalId, Role};
use shopgrid_core::TenantId;

const JWT_SECRET: &str = "test-jwt-secret";
const WEBHOOK_SECRET: &str = "whsec_test";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod; the pool is lazy so no database is needed for
        // the endpoints exercised here.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://unused@localhost:1/shopgrid_test")
            .expect("lazy pool");
        let app = shopgrid_api::app::build_app(
            JWT_SECRET.to_string(),
            WEBHOOK_SECRET.to_string(),
            pool,
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(tenant_id: TenantId, roles: Vec<Role>) -> String {
    let now = Utc::now();
    mint_jwt_with_window(
        tenant_id,
        roles,
        now,
        now + ChronoDuration::minutes(10),
    )
}

fn mint_jwt_with_window(
    tenant_id: TenantId,
    roles: Vec<Role>,
    issued_at: chrono::DateTime<Utc>,
    expires_at: chrono::DateTime<Utc>,
) -> String {
    let claims = JwtClaims {
        sub: PrincipalId::new(),
        tenant_id,
        roles,
        issued_at,
        expires_at,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn stripe_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", server.base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/api/whoami", "/api/tenants/me", "/api/inventory/items", "/api/orders"] {
        let res = client
            .get(format!("{}{path}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "path {path}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "missing_token", "path {path}");
    }
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/whoami", server.base_url))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn expired_token_is_reported_as_expired() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let now = Utc::now();
    let token = mint_jwt_with_window(
        TenantId::new(),
        vec![Role::new("owner")],
        now - ChronoDuration::minutes(30),
        now - ChronoDuration::minutes(5),
    );

    let res = client
        .get(format!("{}/api/whoami", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "token_expired");
}

#[tokio::test]
async fn whoami_echoes_token_context() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let tenant_id = TenantId::new();
    let token = mint_jwt(tenant_id, vec![Role::new("member")]);

    let res = client
        .get(format!("{}/api/whoami", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["tenantId"], tenant_id.to_string());
    assert_eq!(body["roles"], json!(["member"]));
}

#[tokio::test]
async fn member_cannot_erase_tenant_data() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(TenantId::new(), vec![Role::new("member")]);

    let res = client
        .post(format!("{}/api/gdpr/erase", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn non_admin_cannot_touch_flag_overrides() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(TenantId::new(), vec![Role::new("owner")]);

    let res = client
        .put(format!("{}/api/admin/flags/override", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "flag": "checkout_v2", "value": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_set_and_clear_flag_overrides() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(TenantId::new(), vec![Role::new("admin")]);

    let res = client
        .put(format!("{}/api/admin/flags/override", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "flag": "checkout_v2", "value": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["flag"], "checkout_v2");
    assert_eq!(body["override"], false);

    // null clears the override.
    let res = client
        .put(format!("{}/api/admin/flags/override", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "flag": "checkout_v2", "value": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["override"].is_null());
}

#[tokio::test]
async fn flag_override_requires_the_value_key() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(TenantId::new(), vec![Role::new("admin")]);

    // Absent key is not the same as an explicit null.
    let res = client
        .put(format!("{}/api/admin/flags/override", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "flag": "checkout_v2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn invalid_ids_are_rejected_before_any_lookup() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(TenantId::new(), vec![Role::new("owner")]);

    let res = client
        .get(format!("{}/api/inventory/items/not-a-uuid", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn order_with_no_items_fails_validation() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(TenantId::new(), vec![Role::new("owner")]);

    let res = client
        .post(format!("{}/api/orders", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "items": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn featured_requires_both_coordinates() {
    let server = TestServer::spawn().await;
    let res = reqwest::get(format!(
        "{}/api/directory/featured?lat=30.27",
        server.base_url
    ))
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn webhook_without_signature_is_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/webhooks/stripe", server.base_url))
        .body(r#"{"id":"evt_1","type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "missing_signature");
}

#[tokio::test]
async fn webhook_with_bad_signature_is_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let payload = r#"{"id":"evt_1","type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#;
    let signature = stripe_signature("wrong-secret", Utc::now().timestamp(), payload.as_bytes());

    let res = client
        .post(format!("{}/api/webhooks/stripe", server.base_url))
        .header("Stripe-Signature", signature)
        .body(payload)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_signature");
}

#[tokio::test]
async fn webhook_with_stale_timestamp_is_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let payload = r#"{"id":"evt_1","type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#;
    let stale = Utc::now().timestamp() - 3600;
    let signature = stripe_signature(WEBHOOK_SECRET, stale, payload.as_bytes());

    let res = client
        .post(format!("{}/api/webhooks/stripe", server.base_url))
        .header("Stripe-Signature", signature)
        .body(payload)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
