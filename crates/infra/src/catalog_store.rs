//! Tenant-scoped inventory item store.
//!
//! Every statement filters on `tenant_id`; per-tenant SKU uniqueness is the
//! `inventory_items_tenant_id_sku_key` constraint, surfaced as a conflict.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use shopgrid_catalog::{ItemRecord, ItemStatus, ItemVisibility, NewItem};
use shopgrid_core::{CategoryId, ItemId, PageRequest, Pagination, TenantId};

use crate::error::StoreError;

/// Partial update for an item; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub stock_quantity: Option<i64>,
    pub status: Option<ItemStatus>,
    pub visibility: Option<ItemVisibility>,
    pub category_id: Option<CategoryId>,
}

const ITEM_COLUMNS: &str = "id, tenant_id, sku, name, description, price_cents, stock_quantity, \
     status, visibility, category_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, tenant_id: TenantId, item: NewItem) -> Result<ItemRecord, StoreError> {
        let id = ItemId::new();
        let row = sqlx::query(&format!(
            "INSERT INTO inventory_items \
               (id, tenant_id, sku, name, description, price_cents, stock_quantity, \
                status, visibility, category_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'draft', 'private', $8, now(), now()) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(&item.sku)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price_cents)
        .bind(item.stock_quantity)
        .bind(item.category_id.map(|c| *c.as_uuid()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match StoreError::unique_violation(&e) {
            Some(v) => StoreError::conflict_for(v),
            None => StoreError::Database(e),
        })?;

        Ok(item_from_row(&row)?)
    }

    pub async fn get(&self, tenant_id: TenantId, item_id: ItemId) -> Result<ItemRecord, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE tenant_id = $1 AND id = $2"
        ))
        .bind(tenant_id.as_uuid())
        .bind(item_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(item_from_row(&row)?)
    }

    /// Paged list of a tenant's items, optionally filtered by status.
    pub async fn list(
        &self,
        tenant_id: TenantId,
        status: Option<ItemStatus>,
        page: PageRequest,
    ) -> Result<(Vec<ItemRecord>, Pagination), StoreError> {
        let status_str = status.map(|s| s.as_str());

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) FROM inventory_items \
             WHERE tenant_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(tenant_id.as_uuid())
        .bind(status_str)
        .fetch_one(&self.pool)
        .await?
        .try_get(0)?;

        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items \
             WHERE tenant_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(tenant_id.as_uuid())
        .bind(status_str)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(item_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((items, Pagination::new(page, total.max(0) as u64)))
    }

    /// Apply a partial update; absent fields keep their stored value.
    pub async fn update(
        &self,
        tenant_id: TenantId,
        item_id: ItemId,
        update: ItemUpdate,
    ) -> Result<ItemRecord, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE inventory_items SET \
               name = COALESCE($3, name), \
               description = COALESCE($4, description), \
               price_cents = COALESCE($5, price_cents), \
               stock_quantity = COALESCE($6, stock_quantity), \
               status = COALESCE($7, status), \
               visibility = COALESCE($8, visibility), \
               category_id = COALESCE($9, category_id), \
               updated_at = now() \
             WHERE tenant_id = $1 AND id = $2 \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(tenant_id.as_uuid())
        .bind(item_id.as_uuid())
        .bind(update.name)
        .bind(update.description)
        .bind(update.price_cents)
        .bind(update.stock_quantity)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.visibility.map(|v| v.as_str()))
        .bind(update.category_id.map(|c| *c.as_uuid()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(item_from_row(&row)?)
    }

    /// Soft delete: items are archived, never removed, so order lines keep
    /// their references.
    pub async fn archive(&self, tenant_id: TenantId, item_id: ItemId) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE inventory_items SET status = 'archived', updated_at = now() \
             WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id.as_uuid())
        .bind(item_id.as_uuid())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn item_from_row(row: &PgRow) -> Result<ItemRecord, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let visibility: String = row.try_get("visibility")?;
    Ok(ItemRecord {
        id: ItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
        tenant_id: TenantId::from_uuid(row.try_get::<Uuid, _>("tenant_id")?),
        sku: row.try_get("sku")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price_cents: row.try_get("price_cents")?,
        stock_quantity: row.try_get("stock_quantity")?,
        status: ItemStatus::parse(&status).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        visibility: ItemVisibility::parse(&visibility)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        category_id: row
            .try_get::<Option<Uuid>, _>("category_id")?
            .map(CategoryId::from_uuid),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
