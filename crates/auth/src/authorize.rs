use thiserror::Error;

use shopgrid_core::TenantId;

use crate::{Permission, PrincipalId, TenantMembership};

/// A fully resolved principal for authorization decisions.
///
/// Construction of this object is intentionally decoupled from storage and
/// transport: the API layer derives memberships from verified claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub active_tenant_id: TenantId,
    pub membership: TenantMembership,
}

impl Principal {
    /// Build a principal whose active tenant is the membership tenant.
    pub fn new(principal_id: PrincipalId, membership: TenantMembership) -> Self {
        Self {
            principal_id,
            active_tenant_id: membership.tenant_id,
            membership,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal within its active tenant context.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if principal.active_tenant_id != principal.membership.tenant_id {
        return Err(AuthzError::TenantMismatch);
    }

    let allowed = principal
        .membership
        .permissions
        .iter()
        .any(|held| held.grants(required));

    if allowed {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn principal_with_roles(roles: Vec<Role>) -> Principal {
        let tenant_id = TenantId::new();
        Principal::new(
            PrincipalId::new(),
            TenantMembership::from_roles(tenant_id, roles),
        )
    }

    #[test]
    fn wildcard_permission_allows_everything() {
        let p = principal_with_roles(vec![Role::new("admin")]);
        assert!(authorize(&p, &Permission::new("flags.override")).is_ok());
        assert!(authorize(&p, &Permission::new("anything.at.all")).is_ok());
    }

    #[test]
    fn member_is_denied_gdpr_erase() {
        let p = principal_with_roles(vec![Role::new("member")]);
        let err = authorize(&p, &Permission::new("gdpr.erase")).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden("gdpr.erase".to_string()));
    }

    #[test]
    fn owner_can_export_and_erase() {
        let p = principal_with_roles(vec![Role::new("owner")]);
        assert!(authorize(&p, &Permission::new("gdpr.export")).is_ok());
        assert!(authorize(&p, &Permission::new("gdpr.erase")).is_ok());
    }

    #[test]
    fn tenant_mismatch_is_rejected_before_permissions() {
        let mut p = principal_with_roles(vec![Role::new("admin")]);
        p.active_tenant_id = TenantId::new();
        assert_eq!(
            authorize(&p, &Permission::new("tenants.read")),
            Err(AuthzError::TenantMismatch)
        );
    }
}
