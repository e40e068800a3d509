//! GDPR export/erasure record shapes.
//!
//! The stores assemble these; the shapes live here so the API and infra
//! layers agree on the wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopgrid_core::TenantId;

use crate::TenantRecord;

/// Full data bundle returned by the GDPR export endpoint.
///
/// Items and orders are carried as raw JSON values: the export is a verbatim
/// dump of what the platform holds, not a reshaped API view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GdprExportBundle {
    pub tenant: TenantRecord,
    pub inventory_items: Vec<serde_json::Value>,
    pub orders: Vec<serde_json::Value>,
    pub exported_at: DateTime<Utc>,
}

/// Receipt returned by the GDPR erasure endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErasureReceipt {
    pub tenant_id: TenantId,
    pub orders_anonymized: u64,
    pub erased_at: DateTime<Utc>,
}

/// Audit record written alongside an erasure, in the same transaction.
///
/// Erasure destroys data by definition, so this row is the only durable trace
/// of who requested it and what it touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErasureAudit {
    pub tenant_id: TenantId,
    pub action: String,
    pub actor: String,
    pub detail: String,
    pub recorded_at: DateTime<Utc>,
}

impl ErasureAudit {
    pub fn for_erasure(
        tenant_id: TenantId,
        actor: &str,
        orders_anonymized: u64,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tenant_id,
            action: "gdpr_erasure".to_string(),
            actor: actor.to_string(),
            detail: format!("orders_anonymized={orders_anonymized}; inventory deleted; tenant record scrubbed"),
            recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erasure_audit_names_the_actor_and_scope() {
        let tenant_id = TenantId::new();
        let now = Utc::now();
        let audit = ErasureAudit::for_erasure(tenant_id, "user-42", 3, now);

        assert_eq!(audit.tenant_id, tenant_id);
        assert_eq!(audit.action, "gdpr_erasure");
        assert_eq!(audit.actor, "user-42");
        assert!(audit.detail.contains("orders_anonymized=3"));
        assert_eq!(audit.recorded_at, now);
    }
}
