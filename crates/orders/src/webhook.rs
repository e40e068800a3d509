//! Stripe webhook contract: signature verification and event parsing.
//!
//! Stripe signs the raw request body with HMAC-SHA256 over `"{t}.{body}"`
//! and sends `Stripe-Signature: t=<unix>,v1=<hex>[,v1=<hex>...]`.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed skew between the signature timestamp and now.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("malformed signature header")]
    MalformedHeader,

    #[error("signature timestamp outside tolerance")]
    TimestampOutOfTolerance,

    #[error("no matching signature")]
    NoMatch,
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("unparseable event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Parsed `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1_signatures: Vec<String>,
}

/// Parse `t=...,v1=...` (unknown schemes are ignored, per Stripe docs).
pub fn parse_signature_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut v1_signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or(SignatureError::MalformedHeader)?;
        match key {
            "t" => {
                timestamp = Some(value.parse().map_err(|_| SignatureError::MalformedHeader)?);
            }
            "v1" => v1_signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    if v1_signatures.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }

    Ok(SignatureHeader {
        timestamp,
        v1_signatures,
    })
}

/// Verify a webhook signature against the shared secret.
///
/// Comparison is constant-time (via the MAC verify), and the timestamp must
/// be within [`SIGNATURE_TOLERANCE_SECS`] of `now` in either direction.
pub fn verify_signature(
    secret: &str,
    header: &str,
    payload: &[u8],
    now: DateTime<Utc>,
) -> Result<(), SignatureError> {
    let parsed = parse_signature_header(header)?;

    if (now.timestamp() - parsed.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::TimestampOutOfTolerance);
    }

    for candidate in &parsed.v1_signatures {
        let Ok(candidate_bytes) = hex::decode(candidate) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("hmac accepts keys of any length");
        mac.update(parsed.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        if mac.verify_slice(&candidate_bytes).is_ok() {
            return Ok(());
        }
    }

    Err(SignatureError::NoMatch)
}

/// The slice of a Stripe event this platform consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripeEvent {
    /// External event identifier ("evt_..."); the idempotency key.
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripeEventData {
    pub object: StripeEventObject,
}

/// The event's primary object. Only the payment-intent reference and amount
/// are consumed; everything else in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripeEventObject {
    /// Payment intent id ("pi_...") or, for charge events, the charge's
    /// `payment_intent` back-reference.
    pub id: String,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
}

impl StripeEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// The payment-intent reference this event is about.
    pub fn payment_intent(&self) -> &str {
        self.data
            .object
            .payment_intent
            .as_deref()
            .unwrap_or(&self.data.object.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_verifies() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let payload = br#"{"id":"evt_1"}"#;
        let sig = sign("whsec_test", now.timestamp(), payload);
        let header = format!("t={},v1={}", now.timestamp(), sig);

        assert!(verify_signature("whsec_test", &header, payload, now).is_ok());
    }

    #[test]
    fn wrong_secret_does_not_verify() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let payload = br#"{"id":"evt_1"}"#;
        let sig = sign("whsec_other", now.timestamp(), payload);
        let header = format!("t={},v1={}", now.timestamp(), sig);

        assert_eq!(
            verify_signature("whsec_test", &header, payload, now),
            Err(SignatureError::NoMatch)
        );
    }

    #[test]
    fn stale_timestamp_is_rejected_even_with_valid_mac() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let stale = now.timestamp() - SIGNATURE_TOLERANCE_SECS - 1;
        let payload = br#"{"id":"evt_1"}"#;
        let sig = sign("whsec_test", stale, payload);
        let header = format!("t={stale},v1={sig}");

        assert_eq!(
            verify_signature("whsec_test", &header, payload, now),
            Err(SignatureError::TimestampOutOfTolerance)
        );
    }

    #[test]
    fn second_v1_signature_is_accepted() {
        // Stripe sends multiple v1 entries during secret rotation.
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let payload = br#"{"id":"evt_1"}"#;
        let good = sign("whsec_test", now.timestamp(), payload);
        let header = format!("t={0},v1={1},v1={2}", now.timestamp(), "00ff" , good);

        assert!(verify_signature("whsec_test", &header, payload, now).is_ok());
    }

    #[test]
    fn header_without_timestamp_or_v1_is_malformed() {
        assert_eq!(
            parse_signature_header("v1=abcd"),
            Err(SignatureError::MalformedHeader)
        );
        assert_eq!(
            parse_signature_header("t=123"),
            Err(SignatureError::MalformedHeader)
        );
        assert_eq!(
            parse_signature_header("garbage"),
            Err(SignatureError::MalformedHeader)
        );
    }

    #[test]
    fn event_parse_extracts_payment_intent_reference() {
        let payload = br#"{
            "id": "evt_42",
            "type": "charge.refunded",
            "data": { "object": { "id": "ch_1", "payment_intent": "pi_9", "amount": 2800 } }
        }"#;
        let event = StripeEvent::parse(payload).unwrap();
        assert_eq!(event.id, "evt_42");
        assert_eq!(event.payment_intent(), "pi_9");

        let payload = br#"{
            "id": "evt_43",
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": "pi_9", "amount": 2800 } }
        }"#;
        let event = StripeEvent::parse(payload).unwrap();
        assert_eq!(event.payment_intent(), "pi_9");
    }
}
