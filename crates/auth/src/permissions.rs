use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are dotted paths of the form `<resource>.<action>`, e.g.
/// `inventory.items.create` or `gdpr.erase`. Two wildcard forms exist:
/// `*` grants everything (the platform-admin role), and `<resource>.*`
/// grants every action on one resource, so a role can own a whole surface
/// (say `flags.*`) without enumerating each action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }

    /// Everything before the last dot, or the whole string for single-segment
    /// permissions.
    pub fn resource(&self) -> &str {
        match self.as_str().rsplit_once('.') {
            Some((resource, _)) => resource,
            None => self.as_str(),
        }
    }

    /// The final segment: the action on the resource.
    pub fn action(&self) -> &str {
        match self.as_str().rsplit_once('.') {
            Some((_, action)) => action,
            None => self.as_str(),
        }
    }

    /// Whether a held permission satisfies a required one.
    pub fn grants(&self, required: &Permission) -> bool {
        if self.is_wildcard() {
            return true;
        }
        if self.action() == "*" {
            return self.resource() == required.resource();
        }
        self == required
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_resource_and_action_at_the_last_dot() {
        let p = Permission::new("inventory.items.create");
        assert_eq!(p.resource(), "inventory.items");
        assert_eq!(p.action(), "create");
    }

    #[test]
    fn exact_permissions_grant_only_themselves() {
        let held = Permission::new("orders.read");
        assert!(held.grants(&Permission::new("orders.read")));
        assert!(!held.grants(&Permission::new("orders.update")));
        assert!(!held.grants(&Permission::new("tenants.read")));
    }

    #[test]
    fn global_wildcard_grants_everything() {
        let held = Permission::new("*");
        assert!(held.is_wildcard());
        assert!(held.grants(&Permission::new("gdpr.erase")));
        assert!(held.grants(&Permission::new("anything.at.all")));
    }

    #[test]
    fn resource_wildcard_is_scoped_to_its_resource() {
        let held = Permission::new("flags.*");
        assert!(held.grants(&Permission::new("flags.manage")));
        assert!(!held.grants(&Permission::new("orders.read")));
        // Deeper resources do not match a shallower wildcard.
        assert!(!held.grants(&Permission::new("flags.overrides.set")));
    }
}
