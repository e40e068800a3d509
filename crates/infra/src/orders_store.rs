//! Order store: creation is one transaction covering the order row, its
//! lines, the payment record, and the first status-history entry.
//!
//! Webhook idempotency rides on the `webhook_events_event_id_key` constraint:
//! the first insert of an event id wins, replays are no-ops.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use shopgrid_core::{ItemId, OrderId, PageRequest, Pagination, TenantId};
use shopgrid_orders::{
    LineItemInput, OrderStatus, OrderTotals, PaymentStatus, StatusHistoryEntry, StripeEvent,
};

use crate::error::StoreError;

/// Validated input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub shipping_address: Option<String>,
    pub items: Vec<LineItemInput>,
    pub stripe_payment_intent: Option<String>,
}

/// A persisted order row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: OrderId,
    pub tenant_id: TenantId,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub shipping_address: Option<String>,
    pub status: OrderStatus,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub stripe_payment_intent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRecord {
    pub item_id: ItemId,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_cents: i64,
    pub line_total_cents: i64,
}

/// An order with its lines and full status history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub order: OrderRecord,
    pub items: Vec<OrderLineRecord>,
    pub status_history: Vec<StatusHistoryEntry>,
}

const ORDER_COLUMNS: &str = "id, tenant_id, customer_email, customer_name, shipping_address, \
     status, subtotal_cents, tax_cents, shipping_cents, discount_cents, total_cents, \
     stripe_payment_intent, created_at, updated_at";

/// Status reads that precede a status write. The row lock serializes
/// concurrent transitions (API vs webhook) so the history's `from_status`
/// always reflects the state the writer actually replaced.
const ORDER_STATUS_LOCK_SQL: &str =
    "SELECT status FROM orders WHERE tenant_id = $1 AND id = $2 FOR UPDATE";

#[derive(Debug, Clone)]
pub struct OrdersStore {
    pool: PgPool,
}

impl OrdersStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an order with precomputed totals. `totals.line_totals` is
    /// positionally aligned with `order.items`.
    pub async fn create(
        &self,
        tenant_id: TenantId,
        order: NewOrder,
        totals: OrderTotals,
    ) -> Result<OrderDetails, StoreError> {
        let order_id = OrderId::new();
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "INSERT INTO orders \
               (id, tenant_id, customer_email, customer_name, shipping_address, status, \
                subtotal_cents, tax_cents, shipping_cents, discount_cents, total_cents, \
                stripe_payment_intent, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8, $9, $10, $11, $12, $12) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(&order.customer_email)
        .bind(&order.customer_name)
        .bind(&order.shipping_address)
        .bind(totals.subtotal_cents)
        .bind(totals.tax_cents)
        .bind(totals.shipping_cents)
        .bind(totals.discount_cents)
        .bind(totals.total_cents)
        .bind(&order.stripe_payment_intent)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        let record = order_from_row(&row)?;

        let mut lines = Vec::with_capacity(order.items.len());
        for (line, line_total) in order.items.iter().zip(&totals.line_totals) {
            sqlx::query(
                "INSERT INTO order_items \
                   (order_id, item_id, quantity, unit_price_cents, discount_cents, line_total_cents) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(order_id.as_uuid())
            .bind(line.item_id.as_uuid())
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.discount_cents)
            .bind(line_total)
            .execute(&mut *tx)
            .await?;
            lines.push(OrderLineRecord {
                item_id: line.item_id,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                discount_cents: line.discount_cents,
                line_total_cents: *line_total,
            });
        }

        if let Some(intent) = &order.stripe_payment_intent {
            sqlx::query(
                "INSERT INTO payments \
                   (id, order_id, tenant_id, stripe_payment_intent, amount_cents, status, \
                    created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, 'pending', $6, $6)",
            )
            .bind(Uuid::now_v7())
            .bind(order_id.as_uuid())
            .bind(tenant_id.as_uuid())
            .bind(intent)
            .bind(totals.total_cents)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let initial = StatusHistoryEntry::initial(order_id, "api", now);
        insert_history(&mut tx, &initial).await?;

        tx.commit().await?;

        Ok(OrderDetails {
            order: record,
            items: lines,
            status_history: vec![initial],
        })
    }

    pub async fn get(
        &self,
        tenant_id: TenantId,
        order_id: OrderId,
    ) -> Result<OrderDetails, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE tenant_id = $1 AND id = $2"
        ))
        .bind(tenant_id.as_uuid())
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        let order = order_from_row(&row)?;

        let item_rows = sqlx::query(
            "SELECT item_id, quantity, unit_price_cents, discount_cents, line_total_cents \
             FROM order_items WHERE order_id = $1",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        let items = item_rows
            .iter()
            .map(|row| {
                Ok(OrderLineRecord {
                    item_id: ItemId::from_uuid(row.try_get::<Uuid, _>("item_id")?),
                    quantity: row.try_get("quantity")?,
                    unit_price_cents: row.try_get("unit_price_cents")?,
                    discount_cents: row.try_get("discount_cents")?,
                    line_total_cents: row.try_get("line_total_cents")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let history_rows = sqlx::query(
            "SELECT order_id, from_status, to_status, actor, reason, changed_at \
             FROM order_status_history WHERE order_id = $1 ORDER BY changed_at",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        let status_history = history_rows
            .iter()
            .map(history_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderDetails {
            order,
            items,
            status_history,
        })
    }

    pub async fn list(
        &self,
        tenant_id: TenantId,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<(Vec<OrderRecord>, Pagination), StoreError> {
        let status_str = status.map(|s| s.as_str());

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) FROM orders \
             WHERE tenant_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(tenant_id.as_uuid())
        .bind(status_str)
        .fetch_one(&self.pool)
        .await?
        .try_get(0)?;

        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE tenant_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(tenant_id.as_uuid())
        .bind(status_str)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let orders = rows
            .iter()
            .map(order_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((orders, Pagination::new(page, total.max(0) as u64)))
    }

    /// Change an order's status and append the history record. Any status may
    /// follow any other; the history is the audit trail.
    pub async fn update_status(
        &self,
        tenant_id: TenantId,
        order_id: OrderId,
        to: OrderStatus,
        actor: &str,
        reason: Option<String>,
    ) -> Result<OrderRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query(ORDER_STATUS_LOCK_SQL)
            .bind(tenant_id.as_uuid())
            .bind(order_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(current) = current else {
            return Err(StoreError::NotFound);
        };
        let from: String = current.try_get("status")?;
        let from = OrderStatus::parse(&from).map_err(decode_err)?;

        let row = sqlx::query(&format!(
            "UPDATE orders SET status = $3, updated_at = now() \
             WHERE tenant_id = $1 AND id = $2 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(tenant_id.as_uuid())
        .bind(order_id.as_uuid())
        .bind(to.as_str())
        .fetch_one(&mut *tx)
        .await?;
        let record = order_from_row(&row)?;

        let entry = StatusHistoryEntry::transition(order_id, from, to, actor, reason, Utc::now());
        insert_history(&mut tx, &entry).await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Record a webhook event id. Returns `true` when the event is new and
    /// `false` on replay (the unique constraint swallows the duplicate).
    pub async fn record_webhook_event(
        &self,
        event_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO webhook_events (event_id, event_type, payload, received_at) \
             VALUES ($1, $2, $3, now()) \
             ON CONFLICT (event_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(event_type)
        .bind(payload)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Apply a verified, deduplicated Stripe event: update the payment row
    /// and, when the payment outcome implies one, move the order.
    pub async fn apply_payment_event(&self, event: &StripeEvent) -> Result<(), StoreError> {
        let Some(payment_status) = PaymentStatus::from_stripe_event_type(&event.event_type) else {
            tracing::debug!(event_type = %event.event_type, "ignoring unhandled event type");
            return Ok(());
        };
        let intent = event.payment_intent();

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "UPDATE payments SET status = $2, updated_at = now() \
             WHERE stripe_payment_intent = $1 \
             RETURNING order_id, tenant_id",
        )
        .bind(intent)
        .bind(payment_status.as_str())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            tracing::warn!(payment_intent = %intent, "webhook for unknown payment intent");
            tx.commit().await?;
            return Ok(());
        };
        let order_id = OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?);
        let tenant_id = TenantId::from_uuid(row.try_get::<Uuid, _>("tenant_id")?);

        if let Some(to) = payment_status.implied_order_status() {
            let from: String = sqlx::query(ORDER_STATUS_LOCK_SQL)
                .bind(tenant_id.as_uuid())
                .bind(order_id.as_uuid())
                .fetch_one(&mut *tx)
                .await?
                .try_get("status")?;
            let from = OrderStatus::parse(&from).map_err(decode_err)?;

            sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
                .bind(order_id.as_uuid())
                .bind(to.as_str())
                .execute(&mut *tx)
                .await?;

            let entry = StatusHistoryEntry::transition(
                order_id,
                from,
                to,
                "stripe_webhook",
                Some(event.event_type.clone()),
                Utc::now(),
            );
            insert_history(&mut tx, &entry).await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

async fn insert_history(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    entry: &StatusHistoryEntry,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO order_status_history \
           (order_id, from_status, to_status, actor, reason, changed_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(entry.order_id.as_uuid())
    .bind(entry.from_status.map(|s| s.as_str()))
    .bind(entry.to_status.as_str())
    .bind(&entry.actor)
    .bind(&entry.reason)
    .bind(entry.changed_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn decode_err(e: shopgrid_core::DomainError) -> StoreError {
    StoreError::Database(sqlx::Error::Decode(Box::new(e)))
}

fn order_from_row(row: &PgRow) -> Result<OrderRecord, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(OrderRecord {
        id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
        tenant_id: TenantId::from_uuid(row.try_get::<Uuid, _>("tenant_id")?),
        customer_email: row.try_get("customer_email")?,
        customer_name: row.try_get("customer_name")?,
        shipping_address: row.try_get("shipping_address")?,
        status: OrderStatus::parse(&status).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        subtotal_cents: row.try_get("subtotal_cents")?,
        tax_cents: row.try_get("tax_cents")?,
        shipping_cents: row.try_get("shipping_cents")?,
        discount_cents: row.try_get("discount_cents")?,
        total_cents: row.try_get("total_cents")?,
        stripe_payment_intent: row.try_get("stripe_payment_intent")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn history_from_row(row: &PgRow) -> Result<StatusHistoryEntry, sqlx::Error> {
    let from: Option<String> = row.try_get("from_status")?;
    let to: String = row.try_get("to_status")?;
    Ok(StatusHistoryEntry {
        order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
        from_status: from
            .map(|s| OrderStatus::parse(&s))
            .transpose()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        to_status: OrderStatus::parse(&to).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        actor: row.try_get("actor")?,
        reason: row.try_get("reason")?,
        changed_at: row.try_get("changed_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reads_before_writes_lock_the_order_row() {
        assert!(ORDER_STATUS_LOCK_SQL.ends_with("FOR UPDATE"));
        assert!(ORDER_STATUS_LOCK_SQL.contains("tenant_id = $1 AND id = $2"));
    }
}
