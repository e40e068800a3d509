use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role identifier used for RBAC.
///
/// Roles are opaque strings at this layer; the policy mapping below translates
/// the platform's built-in roles into permissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Built-in role → permission mapping.
///
/// - `admin`: wildcard (platform operators).
/// - `owner`: everything within the tenant, including GDPR operations.
/// - `member`: day-to-day catalog and order work, read-only tenant record.
/// - unknown roles grant nothing.
pub fn role_permissions(role: &Role) -> Vec<Permission> {
    match role.as_str() {
        "admin" => vec![Permission::new("*")],
        "owner" => vec![
            Permission::new("tenants.read"),
            Permission::new("tenants.update"),
            Permission::new("inventory.items.create"),
            Permission::new("inventory.items.read"),
            Permission::new("inventory.items.update"),
            Permission::new("orders.create"),
            Permission::new("orders.read"),
            Permission::new("orders.update"),
            Permission::new("gdpr.export"),
            Permission::new("gdpr.erase"),
        ],
        "member" => vec![
            Permission::new("tenants.read"),
            Permission::new("inventory.items.create"),
            Permission::new("inventory.items.read"),
            Permission::new("inventory.items.update"),
            Permission::new("orders.create"),
            Permission::new("orders.read"),
            Permission::new("orders.update"),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_maps_to_wildcard() {
        let perms = role_permissions(&Role::new("admin"));
        assert_eq!(perms.len(), 1);
        assert!(perms[0].is_wildcard());
    }

    #[test]
    fn member_cannot_erase_tenant_data() {
        let perms = role_permissions(&Role::new("member"));
        assert!(!perms.iter().any(|p| p.as_str() == "gdpr.erase"));
        assert!(perms.iter().any(|p| p.as_str() == "orders.create"));
    }

    #[test]
    fn unknown_role_grants_nothing() {
        assert!(role_permissions(&Role::new("intern")).is_empty());
    }
}
