use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopgrid_core::{DomainError, TenantId};

/// Subscription tier of a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "free" => Ok(Self::Free),
            "basic" => Ok(Self::Basic),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(DomainError::validation(format!(
                "unknown subscription tier: {other}"
            ))),
        }
    }
}

/// Account lifecycle status of a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Pending,
    Active,
    Suspended,
    Closed,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "closed" => Ok(Self::Closed),
            other => Err(DomainError::validation(format!(
                "unknown tenant status: {other}"
            ))),
        }
    }
}

/// Whether the tenant appears in the public directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationStatus {
    Unlisted,
    Listed,
    Featured,
}

impl LocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unlisted => "unlisted",
            Self::Listed => "listed",
            Self::Featured => "featured",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "unlisted" => Ok(Self::Unlisted),
            "listed" => Ok(Self::Listed),
            "featured" => Ok(Self::Featured),
            other => Err(DomainError::validation(format!(
                "unknown location status: {other}"
            ))),
        }
    }
}

/// A persisted tenant record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRecord {
    pub id: TenantId,
    pub name: String,
    pub subdomain: String,
    pub subscription_tier: SubscriptionTier,
    pub status: TenantStatus,
    pub location_status: LocationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTenant {
    pub name: String,
    pub subdomain: String,
    pub subscription_tier: SubscriptionTier,
}

impl NewTenant {
    /// Validate and normalize raw input. The subdomain is lowercased before
    /// validation; uniqueness is enforced by the database constraint.
    pub fn parse(name: &str, subdomain: &str, tier: SubscriptionTier) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        if name.len() > 200 {
            return Err(DomainError::validation("name must be at most 200 characters"));
        }

        let subdomain = subdomain.trim().to_ascii_lowercase();
        validate_subdomain(&subdomain)?;

        Ok(Self {
            name: name.to_string(),
            subdomain,
            subscription_tier: tier,
        })
    }
}

/// Subdomain rules: 3–63 chars, lowercase alphanumeric plus hyphens, no
/// leading/trailing hyphen.
pub fn validate_subdomain(s: &str) -> Result<(), DomainError> {
    if s.len() < 3 || s.len() > 63 {
        return Err(DomainError::validation(
            "subdomain must be between 3 and 63 characters",
        ));
    }
    if s.starts_with('-') || s.ends_with('-') {
        return Err(DomainError::validation(
            "subdomain must not start or end with a hyphen",
        ));
    }
    if !s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(DomainError::validation(
            "subdomain may only contain lowercase letters, digits and hyphens",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_subdomains_pass() {
        assert!(validate_subdomain("acme").is_ok());
        assert!(validate_subdomain("acme-store-7").is_ok());
        assert!(validate_subdomain("a1b").is_ok());
    }

    #[test]
    fn subdomain_length_bounds_are_enforced() {
        assert!(validate_subdomain("ab").is_err());
        assert!(validate_subdomain(&"a".repeat(64)).is_err());
        assert!(validate_subdomain(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn subdomain_rejects_edge_hyphens_and_bad_chars() {
        assert!(validate_subdomain("-acme").is_err());
        assert!(validate_subdomain("acme-").is_err());
        assert!(validate_subdomain("acme_store").is_err());
        assert!(validate_subdomain("Acme").is_err());
    }

    #[test]
    fn new_tenant_normalizes_subdomain_case() {
        let t = NewTenant::parse("Acme Stores", "  ACME-Store  ", SubscriptionTier::Free).unwrap();
        assert_eq!(t.subdomain, "acme-store");
        assert_eq!(t.name, "Acme Stores");
    }

    #[test]
    fn new_tenant_rejects_empty_name() {
        let err = NewTenant::parse("   ", "acme", SubscriptionTier::Free).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn tier_and_status_round_trip_through_strings() {
        for tier in [
            SubscriptionTier::Free,
            SubscriptionTier::Basic,
            SubscriptionTier::Pro,
            SubscriptionTier::Enterprise,
        ] {
            assert_eq!(SubscriptionTier::parse(tier.as_str()).unwrap(), tier);
        }
        for status in [
            TenantStatus::Pending,
            TenantStatus::Active,
            TenantStatus::Suspended,
            TenantStatus::Closed,
        ] {
            assert_eq!(TenantStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(SubscriptionTier::parse("platinum").is_err());
    }
}
