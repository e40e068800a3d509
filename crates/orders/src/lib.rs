//! `shopgrid-orders` — order/payment domain model.
//!
//! All monetary amounts are integer cents. Totals are computed with checked
//! arithmetic; invalid inputs fail validation instead of wrapping or clamping.

pub mod order;
pub mod payment;
pub mod webhook;

pub use order::{
    compute_totals, LineItemInput, OrderStatus, OrderTotals, StatusHistoryEntry,
};
pub use payment::PaymentStatus;
pub use webhook::{
    parse_signature_header, verify_signature, SignatureError, StripeEvent, WebhookError,
    SIGNATURE_TOLERANCE_SECS,
};
