use serde::{Deserialize, Serialize};

use shopgrid_core::DomainError;

use crate::OrderStatus;

/// Payment lifecycle status, mirroring what Stripe reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(DomainError::validation(format!(
                "unknown payment status: {other}"
            ))),
        }
    }

    /// Map a Stripe event type to the payment status it implies, if any.
    pub fn from_stripe_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            "payment_intent.succeeded" => Some(Self::Succeeded),
            "payment_intent.payment_failed" => Some(Self::Failed),
            "charge.refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    /// The order status a payment outcome moves the order to, if any.
    pub fn implied_order_status(&self) -> Option<OrderStatus> {
        match self {
            Self::Succeeded => Some(OrderStatus::Paid),
            Self::Refunded => Some(OrderStatus::Refunded),
            // A failed payment leaves the order pending for retry.
            Self::Pending | Self::Failed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_stripe_events_map_to_statuses() {
        assert_eq!(
            PaymentStatus::from_stripe_event_type("payment_intent.succeeded"),
            Some(PaymentStatus::Succeeded)
        );
        assert_eq!(
            PaymentStatus::from_stripe_event_type("payment_intent.payment_failed"),
            Some(PaymentStatus::Failed)
        );
        assert_eq!(
            PaymentStatus::from_stripe_event_type("charge.refunded"),
            Some(PaymentStatus::Refunded)
        );
        assert_eq!(PaymentStatus::from_stripe_event_type("customer.created"), None);
    }

    #[test]
    fn succeeded_payment_marks_order_paid() {
        assert_eq!(
            PaymentStatus::Succeeded.implied_order_status(),
            Some(OrderStatus::Paid)
        );
        assert_eq!(PaymentStatus::Failed.implied_order_status(), None);
    }
}
