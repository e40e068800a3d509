//! Store error model: maps database failures onto the API's error taxonomy.

use thiserror::Error;

/// Which uniqueness invariant a constraint violation hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueViolation {
    /// Per-tenant SKU uniqueness on inventory items.
    Sku,
    /// Global subdomain uniqueness on tenants.
    Subdomain,
    /// Webhook event-id uniqueness (the idempotency guard).
    WebhookEvent,
    /// Some other unique constraint.
    Other,
}

/// Map a Postgres constraint name to the invariant it protects.
pub fn violation_for_constraint(name: &str) -> UniqueViolation {
    match name {
        "inventory_items_tenant_id_sku_key" => UniqueViolation::Sku,
        "tenants_subdomain_key" => UniqueViolation::Subdomain,
        "webhook_events_event_id_key" => UniqueViolation::WebhookEvent,
        _ => UniqueViolation::Other,
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Detect a unique-constraint violation (SQLSTATE 23505) in a sqlx error.
    pub fn unique_violation(err: &sqlx::Error) -> Option<UniqueViolation> {
        let db_err = err.as_database_error()?;
        if db_err.code().as_deref() != Some("23505") {
            return None;
        }
        Some(
            db_err
                .constraint()
                .map(violation_for_constraint)
                .unwrap_or(UniqueViolation::Other),
        )
    }

    /// Conflict error carrying the API error code for a violated invariant.
    pub fn conflict_for(violation: UniqueViolation) -> Self {
        match violation {
            UniqueViolation::Sku => Self::Conflict("duplicate_sku"),
            UniqueViolation::Subdomain => Self::Conflict("duplicate_subdomain"),
            UniqueViolation::WebhookEvent => Self::Conflict("duplicate_event"),
            UniqueViolation::Other => Self::Conflict("conflict"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constraints_map_to_their_invariants() {
        assert_eq!(
            violation_for_constraint("inventory_items_tenant_id_sku_key"),
            UniqueViolation::Sku
        );
        assert_eq!(
            violation_for_constraint("tenants_subdomain_key"),
            UniqueViolation::Subdomain
        );
        assert_eq!(
            violation_for_constraint("webhook_events_event_id_key"),
            UniqueViolation::WebhookEvent
        );
        assert_eq!(
            violation_for_constraint("orders_pkey"),
            UniqueViolation::Other
        );
    }

    #[test]
    fn conflicts_carry_api_error_codes() {
        match StoreError::conflict_for(UniqueViolation::Sku) {
            StoreError::Conflict(code) => assert_eq!(code, "duplicate_sku"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }
}
