//! Stripe webhook intake.
//!
//! Flow: verify the signature over the raw body, record the event id (the
//! idempotency gate), acknowledge with 200, then process in a background
//! task. Stripe retries on non-2xx, so the acknowledgment must not wait on
//! payment processing.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

use shopgrid_orders::{verify_signature, StripeEvent};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn stripe_webhook(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let Some(signature) = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
    else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_signature",
            "Stripe-Signature header is required",
        );
    };

    if let Err(e) = verify_signature(&services.webhook_secret, signature, &body, Utc::now()) {
        tracing::warn!(error = %e, "webhook signature rejected");
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_signature", e.to_string());
    }

    let event = match StripeEvent::parse(&body) {
        Ok(e) => e,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_payload", e.to_string())
        }
    };

    let payload: serde_json::Value =
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    let is_new = match services
        .orders
        .record_webhook_event(&event.id, &event.event_type, &payload)
        .await
    {
        Ok(b) => b,
        Err(e) => return errors::store_error_to_response(e),
    };

    if is_new {
        let services = services.clone();
        tokio::spawn(async move {
            if let Err(e) = services.orders.apply_payment_event(&event).await {
                tracing::error!(error = %e, event_id = %event.id, "failed to apply payment event");
            }
        });
    } else {
        tracing::info!(event_id = %event.id, "duplicate webhook event ignored");
    }

    (StatusCode::OK, Json(json!({ "received": true }))).into_response()
}
