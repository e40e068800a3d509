//! Tenant lifecycle store, including the GDPR export/erasure operations.

use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use shopgrid_core::{PageRequest, Pagination, TenantId};
use shopgrid_tenants::{
    ErasureAudit, ErasureReceipt, GdprExportBundle, LocationStatus, NewTenant, SubscriptionTier,
    TenantRecord, TenantStatus,
};

use crate::error::StoreError;

/// Partial update for a tenant; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub subscription_tier: Option<SubscriptionTier>,
    pub status: Option<TenantStatus>,
    pub location_status: Option<LocationStatus>,
}

const TENANT_COLUMNS: &str = "id, name, subdomain, subscription_tier, status, location_status, \
     created_at, updated_at";

#[derive(Debug, Clone)]
pub struct TenantsStore {
    pool: PgPool,
}

impl TenantsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, tenant: NewTenant) -> Result<TenantRecord, StoreError> {
        let id = TenantId::new();
        let row = sqlx::query(&format!(
            "INSERT INTO tenants \
               (id, name, subdomain, subscription_tier, status, location_status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, 'pending', 'unlisted', now(), now()) \
             RETURNING {TENANT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(&tenant.name)
        .bind(&tenant.subdomain)
        .bind(tenant.subscription_tier.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match StoreError::unique_violation(&e) {
            Some(v) => StoreError::conflict_for(v),
            None => StoreError::Database(e),
        })?;

        Ok(tenant_from_row(&row)?)
    }

    pub async fn get(&self, tenant_id: TenantId) -> Result<TenantRecord, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"
        ))
        .bind(tenant_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(tenant_from_row(&row)?)
    }

    pub async fn list(&self, page: PageRequest) -> Result<(Vec<TenantRecord>, Pagination), StoreError> {
        let total: i64 = sqlx::query("SELECT COUNT(*) FROM tenants")
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;

        let rows = sqlx::query(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants \
             ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let tenants = rows
            .iter()
            .map(tenant_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((tenants, Pagination::new(page, total.max(0) as u64)))
    }

    pub async fn update(
        &self,
        tenant_id: TenantId,
        update: TenantUpdate,
    ) -> Result<TenantRecord, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE tenants SET \
               name = COALESCE($2, name), \
               subscription_tier = COALESCE($3, subscription_tier), \
               status = COALESCE($4, status), \
               location_status = COALESCE($5, location_status), \
               updated_at = now() \
             WHERE id = $1 \
             RETURNING {TENANT_COLUMNS}"
        ))
        .bind(tenant_id.as_uuid())
        .bind(update.name)
        .bind(update.subscription_tier.map(|t| t.as_str()))
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.location_status.map(|l| l.as_str()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(tenant_from_row(&row)?)
    }

    /// GDPR data export: the tenant record plus verbatim JSON dumps of its
    /// inventory and orders.
    pub async fn gdpr_export(&self, tenant_id: TenantId) -> Result<GdprExportBundle, StoreError> {
        let tenant = self.get(tenant_id).await?;

        let items = sqlx::query(
            "SELECT row_to_json(i) FROM inventory_items i WHERE tenant_id = $1 ORDER BY created_at",
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        let inventory_items = items
            .iter()
            .map(|row| row.try_get::<serde_json::Value, _>(0))
            .collect::<Result<Vec<_>, _>>()?;

        let order_rows = sqlx::query(
            "SELECT row_to_json(o) FROM orders o WHERE tenant_id = $1 ORDER BY created_at",
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        let orders = order_rows
            .iter()
            .map(|row| row.try_get::<serde_json::Value, _>(0))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GdprExportBundle {
            tenant,
            inventory_items,
            orders,
            exported_at: Utc::now(),
        })
    }

    /// GDPR erasure, in one transaction: anonymize order customer fields,
    /// delete inventory, close the tenant with its name scrubbed, and record
    /// an audit row naming the requesting actor.
    ///
    /// Orders are kept (anonymized) for financial records; the subdomain is
    /// released by suffixing it with the tenant id so re-registration works.
    pub async fn gdpr_erase(
        &self,
        tenant_id: TenantId,
        actor: &str,
    ) -> Result<ErasureReceipt, StoreError> {
        let mut tx = self.pool.begin().await?;

        let exists: i64 = sqlx::query("SELECT COUNT(*) FROM tenants WHERE id = $1")
            .bind(tenant_id.as_uuid())
            .fetch_one(&mut *tx)
            .await?
            .try_get(0)?;
        if exists == 0 {
            return Err(StoreError::NotFound);
        }

        let anonymized = sqlx::query(
            "UPDATE orders SET customer_email = NULL, customer_name = NULL, \
               shipping_address = NULL, updated_at = now() \
             WHERE tenant_id = $1",
        )
        .bind(tenant_id.as_uuid())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("DELETE FROM inventory_items WHERE tenant_id = $1")
            .bind(tenant_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE tenants SET name = 'erased', \
               subdomain = 'erased-' || id::text, \
               status = 'closed', location_status = 'unlisted', updated_at = now() \
             WHERE id = $1",
        )
        .bind(tenant_id.as_uuid())
        .execute(&mut *tx)
        .await?;

        let erased_at = Utc::now();
        let audit = ErasureAudit::for_erasure(tenant_id, actor, anonymized, erased_at);
        sqlx::query(
            "INSERT INTO tenant_audit_log (id, tenant_id, action, actor, detail, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::now_v7())
        .bind(audit.tenant_id.as_uuid())
        .bind(&audit.action)
        .bind(&audit.actor)
        .bind(&audit.detail)
        .bind(audit.recorded_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ErasureReceipt {
            tenant_id,
            orders_anonymized: anonymized,
            erased_at,
        })
    }
}

fn tenant_from_row(row: &PgRow) -> Result<TenantRecord, sqlx::Error> {
    let tier: String = row.try_get("subscription_tier")?;
    let status: String = row.try_get("status")?;
    let location: String = row.try_get("location_status")?;
    Ok(TenantRecord {
        id: TenantId::from_uuid(row.try_get::<Uuid, _>("id")?),
        name: row.try_get("name")?,
        subdomain: row.try_get("subdomain")?,
        subscription_tier: SubscriptionTier::parse(&tier)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        status: TenantStatus::parse(&status).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        location_status: LocationStatus::parse(&location)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
