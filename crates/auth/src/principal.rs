use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shopgrid_core::{DomainError, TenantId};

use crate::{Permission, Role};

/// Identifier of an authenticated principal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PrincipalId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid =
            Uuid::from_str(s).map_err(|e| DomainError::invalid_id(format!("PrincipalId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// A principal's membership within one tenant: roles plus the flattened
/// permission set derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantMembership {
    pub tenant_id: TenantId,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl TenantMembership {
    /// Derive a membership from token roles using the built-in role policy.
    pub fn from_roles(tenant_id: TenantId, roles: Vec<Role>) -> Self {
        let mut permissions: Vec<Permission> = Vec::new();
        for role in &roles {
            for perm in crate::roles::role_permissions(role) {
                if !permissions.contains(&perm) {
                    permissions.push(perm);
                }
            }
        }
        Self {
            tenant_id,
            roles,
            permissions,
        }
    }
}
