//! Feature-flag resolution backed by the `feature_flags` table plus the
//! in-memory override map.

use std::sync::Arc;

use serde::Serialize;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use shopgrid_core::TenantId;
use shopgrid_flags::{resolve_effective, EffectiveFlag, FlagScope, OverrideStore};

use crate::error::StoreError;

/// A persisted flag row, for the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedFlag {
    pub flag_name: String,
    pub tenant_id: Option<TenantId>,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct FlagService {
    pool: PgPool,
    overrides: Arc<OverrideStore>,
}

impl FlagService {
    pub fn new(pool: PgPool, overrides: Arc<OverrideStore>) -> Self {
        Self { pool, overrides }
    }

    /// Resolve a flag for a tenant (or for platform scope when `tenant_id` is
    /// `None`). Precedence: override, tenant row, platform row, `false`.
    pub async fn effective(
        &self,
        flag: &str,
        tenant_id: Option<TenantId>,
    ) -> Result<EffectiveFlag, StoreError> {
        let override_value = match tenant_id {
            Some(id) => self
                .overrides
                .get(flag, FlagScope::Tenant(id))
                .or_else(|| self.overrides.get(flag, FlagScope::Platform)),
            None => self.overrides.get(flag, FlagScope::Platform),
        };

        let tenant_persisted = match tenant_id {
            Some(id) => sqlx::query(
                "SELECT enabled FROM feature_flags WHERE flag_name = $1 AND tenant_id = $2",
            )
            .bind(flag)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(|row| row.try_get("enabled"))
            .transpose()?,
            None => None,
        };

        let platform_persisted = sqlx::query(
            "SELECT enabled FROM feature_flags WHERE flag_name = $1 AND tenant_id IS NULL",
        )
        .bind(flag)
        .fetch_optional(&self.pool)
        .await?
        .map(|row| row.try_get("enabled"))
        .transpose()?;

        Ok(resolve_effective(
            override_value,
            tenant_persisted,
            platform_persisted,
        ))
    }

    /// Set or clear a runtime override. `None` reverts to persisted values.
    pub fn set_override(&self, flag: &str, scope: FlagScope, value: Option<bool>) {
        self.overrides.set(flag, scope, value);
    }

    /// Active overrides, for the admin inspection endpoint.
    pub fn overrides_snapshot(&self) -> Vec<(String, FlagScope, bool)> {
        self.overrides.snapshot()
    }

    /// Upsert a persisted flag row.
    pub async fn set_persisted(
        &self,
        flag: &str,
        tenant_id: Option<TenantId>,
        enabled: bool,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO feature_flags (flag_name, tenant_id, enabled, updated_at) \
             VALUES ($1, $2, $3, now()) \
             ON CONFLICT (flag_name, tenant_id) \
             DO UPDATE SET enabled = EXCLUDED.enabled, updated_at = now()",
        )
        .bind(flag)
        .bind(tenant_id.map(|id| *id.as_uuid()))
        .bind(enabled)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All persisted flag rows, for the admin listing.
    pub async fn list_persisted(&self) -> Result<Vec<PersistedFlag>, StoreError> {
        let rows = sqlx::query(
            "SELECT flag_name, tenant_id, enabled FROM feature_flags \
             ORDER BY flag_name, tenant_id NULLS FIRST",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PersistedFlag {
                    flag_name: row.try_get("flag_name")?,
                    tenant_id: row
                        .try_get::<Option<Uuid>, _>("tenant_id")?
                        .map(TenantId::from_uuid),
                    enabled: row.try_get("enabled")?,
                })
            })
            .collect()
    }
}
