use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopgrid_core::{DomainError, ItemId, OrderId};

/// Order lifecycle status.
///
/// Transitions are NOT validated: the history table is an audit trail, not a
/// state machine. Any status may follow any other; what matters is that every
/// change is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Fulfilled,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Fulfilled => "fulfilled",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "fulfilled" => Ok(Self::Fulfilled),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(DomainError::validation(format!("unknown order status: {other}"))),
        }
    }
}

/// One order line as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    pub item_id: ItemId,
    pub quantity: i64,
    /// Unit price in cents.
    pub unit_price_cents: i64,
    /// Per-line discount in cents, applied to the whole line.
    #[serde(default)]
    pub discount_cents: i64,
}

/// Computed totals for an order, all in integer cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub line_totals: Vec<i64>,
}

/// Compute line and order totals.
///
/// line total  = quantity * unit_price_cents - line discount
/// subtotal    = Σ line totals
/// total       = subtotal + tax + shipping - order discount
///
/// Rejects: empty item sets, non-positive quantities, negative amounts,
/// line discounts exceeding the line value, order totals below zero, and
/// arithmetic overflow.
pub fn compute_totals(
    items: &[LineItemInput],
    tax_cents: i64,
    shipping_cents: i64,
    discount_cents: i64,
) -> Result<OrderTotals, DomainError> {
    if items.is_empty() {
        return Err(DomainError::validation("order must contain at least one item"));
    }
    for (label, v) in [
        ("tax_cents", tax_cents),
        ("shipping_cents", shipping_cents),
        ("discount_cents", discount_cents),
    ] {
        if v < 0 {
            return Err(DomainError::validation(format!("{label} must not be negative")));
        }
    }

    let mut line_totals = Vec::with_capacity(items.len());
    let mut subtotal: i64 = 0;

    for (idx, item) in items.iter().enumerate() {
        if item.quantity <= 0 {
            return Err(DomainError::validation(format!(
                "item {idx}: quantity must be positive"
            )));
        }
        if item.unit_price_cents < 0 || item.discount_cents < 0 {
            return Err(DomainError::validation(format!(
                "item {idx}: amounts must not be negative"
            )));
        }

        let gross = item
            .quantity
            .checked_mul(item.unit_price_cents)
            .ok_or_else(|| DomainError::validation(format!("item {idx}: line total overflow")))?;

        let line_total = gross.checked_sub(item.discount_cents).filter(|t| *t >= 0).ok_or_else(
            || DomainError::validation(format!("item {idx}: discount exceeds line value")),
        )?;

        subtotal = subtotal
            .checked_add(line_total)
            .ok_or_else(|| DomainError::validation("subtotal overflow"))?;
        line_totals.push(line_total);
    }

    let total = subtotal
        .checked_add(tax_cents)
        .and_then(|t| t.checked_add(shipping_cents))
        .ok_or_else(|| DomainError::validation("total overflow"))?
        .checked_sub(discount_cents)
        .filter(|t| *t >= 0)
        .ok_or_else(|| DomainError::validation("discount exceeds order value"))?;

    Ok(OrderTotals {
        subtotal_cents: subtotal,
        tax_cents,
        shipping_cents,
        discount_cents,
        total_cents: total,
        line_totals,
    })
}

/// One immutable status-change record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub order_id: OrderId,
    pub from_status: Option<OrderStatus>,
    pub to_status: OrderStatus,
    pub actor: String,
    pub reason: Option<String>,
    pub changed_at: DateTime<Utc>,
}

impl StatusHistoryEntry {
    /// Record for the initial status of a freshly created order.
    pub fn initial(order_id: OrderId, actor: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            order_id,
            from_status: None,
            to_status: OrderStatus::Pending,
            actor: actor.into(),
            reason: None,
            changed_at: at,
        }
    }

    pub fn transition(
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        actor: impl Into<String>,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            from_status: Some(from),
            to_status: to,
            actor: actor.into(),
            reason,
            changed_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn line(quantity: i64, unit_price_cents: i64, discount_cents: i64) -> LineItemInput {
        LineItemInput {
            item_id: ItemId::new(),
            quantity,
            unit_price_cents,
            discount_cents,
        }
    }

    #[test]
    fn worked_example_from_the_order_contract() {
        // Two items (1000¢ x2, 500¢ x1) plus 300¢ shipping.
        let totals = compute_totals(&[line(2, 1000, 0), line(1, 500, 0)], 0, 300, 0).unwrap();
        assert_eq!(totals.subtotal_cents, 2500);
        assert_eq!(totals.total_cents, 2800);
        assert_eq!(totals.line_totals, vec![2000, 500]);
    }

    #[test]
    fn line_discount_reduces_subtotal() {
        let totals = compute_totals(&[line(3, 400, 200)], 0, 0, 0).unwrap();
        assert_eq!(totals.subtotal_cents, 1000);
        assert_eq!(totals.total_cents, 1000);
    }

    #[test]
    fn empty_order_is_rejected() {
        assert!(compute_totals(&[], 0, 0, 0).is_err());
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        assert!(compute_totals(&[line(0, 100, 0)], 0, 0, 0).is_err());
        assert!(compute_totals(&[line(-2, 100, 0)], 0, 0, 0).is_err());
    }

    #[test]
    fn discount_larger_than_line_value_is_rejected() {
        assert!(compute_totals(&[line(1, 100, 101)], 0, 0, 0).is_err());
    }

    #[test]
    fn order_discount_larger_than_order_value_is_rejected() {
        assert!(compute_totals(&[line(1, 100, 0)], 0, 0, 101).is_err());
    }

    #[test]
    fn overflow_is_a_validation_error_not_a_panic() {
        assert!(compute_totals(&[line(i64::MAX, 2, 0)], 0, 0, 0).is_err());
    }

    #[test]
    fn initial_history_entry_has_no_from_status() {
        let entry = StatusHistoryEntry::initial(OrderId::new(), "api", Utc::now());
        assert_eq!(entry.from_status, None);
        assert_eq!(entry.to_status, OrderStatus::Pending);
    }

    proptest! {
        #[test]
        fn total_identity_holds_for_all_valid_inputs(
            lines in proptest::collection::vec(
                (1i64..1000, 0i64..100_000, 0i64..100).prop_map(|(q, p, d)| {
                    // Keep the discount within the line value so input is valid.
                    let d = d.min(q * p);
                    (q, p, d)
                }),
                1..10,
            ),
            tax in 0i64..100_000,
            shipping in 0i64..100_000,
        ) {
            let items: Vec<LineItemInput> =
                lines.iter().map(|(q, p, d)| line(*q, *p, *d)).collect();
            let totals = compute_totals(&items, tax, shipping, 0).unwrap();

            prop_assert_eq!(
                totals.total_cents,
                totals.subtotal_cents + totals.tax_cents + totals.shipping_cents
                    - totals.discount_cents
            );
            prop_assert_eq!(
                totals.subtotal_cents,
                totals.line_totals.iter().sum::<i64>()
            );
            prop_assert!(totals.line_totals.iter().all(|t| *t >= 0));
        }
    }
}
