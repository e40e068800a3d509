use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopgrid_core::{CategoryId, DomainError, ItemId, TenantId};

/// Publication status of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Draft,
    Active,
    Archived,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            other => Err(DomainError::validation(format!("unknown item status: {other}"))),
        }
    }
}

/// Whether the item shows on the public storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemVisibility {
    Public,
    Private,
}

impl ItemVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(DomainError::validation(format!(
                "unknown item visibility: {other}"
            ))),
        }
    }
}

/// A persisted catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
    pub tenant_id: TenantId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: i64,
    pub status: ItemStatus,
    pub visibility: ItemVisibility,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: i64,
    pub category_id: Option<CategoryId>,
}

impl NewItem {
    /// Validate and normalize raw input. The SKU is uppercased before
    /// validation; per-tenant uniqueness is a database constraint.
    pub fn parse(
        sku: &str,
        name: &str,
        description: Option<String>,
        price_cents: i64,
        stock_quantity: i64,
        category_id: Option<CategoryId>,
    ) -> Result<Self, DomainError> {
        let sku = sku.trim().to_ascii_uppercase();
        validate_sku(&sku)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }

        if price_cents < 0 {
            return Err(DomainError::validation("price_cents must not be negative"));
        }
        if stock_quantity < 0 {
            return Err(DomainError::validation("stock_quantity must not be negative"));
        }

        Ok(Self {
            sku,
            name: name.to_string(),
            description,
            price_cents,
            stock_quantity,
            category_id,
        })
    }
}

/// SKU rules: 1–64 chars, uppercase alphanumeric plus `-` and `_`.
pub fn validate_sku(s: &str) -> Result<(), DomainError> {
    if s.is_empty() || s.len() > 64 {
        return Err(DomainError::validation(
            "sku must be between 1 and 64 characters",
        ));
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(DomainError::validation(
            "sku may only contain uppercase letters, digits, hyphens and underscores",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_is_uppercased_on_parse() {
        let item = NewItem::parse("ab-123", "Widget", None, 1000, 5, None).unwrap();
        assert_eq!(item.sku, "AB-123");
    }

    #[test]
    fn sku_rejects_spaces_and_symbols() {
        assert!(validate_sku("AB 123").is_err());
        assert!(validate_sku("AB#123").is_err());
        assert!(validate_sku("").is_err());
        assert!(validate_sku(&"A".repeat(65)).is_err());
        assert!(validate_sku("WIDGET_01").is_ok());
    }

    #[test]
    fn negative_price_or_stock_is_rejected() {
        assert!(NewItem::parse("A1", "Widget", None, -1, 0, None).is_err());
        assert!(NewItem::parse("A1", "Widget", None, 0, -5, None).is_err());
        assert!(NewItem::parse("A1", "Widget", None, 0, 0, None).is_ok());
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(NewItem::parse("A1", "  ", None, 100, 1, None).is_err());
    }
}
