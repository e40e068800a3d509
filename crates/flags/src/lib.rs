//! `shopgrid-flags` — feature flag resolution.
//!
//! Effective value precedence (highest first):
//!   1. in-memory runtime override (ephemeral kill switch)
//!   2. tenant-scoped persisted flag
//!   3. platform-scoped persisted flag
//!   4. default `false`
//!
//! Overrides deliberately do not survive a restart.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;

use shopgrid_core::TenantId;

/// Scope a flag value applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagScope {
    Platform,
    Tenant(TenantId),
}

/// Where the effective value came from, for admin inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSource {
    Override,
    TenantFlag,
    PlatformFlag,
    Default,
}

/// An effective flag decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectiveFlag {
    pub value: bool,
    pub source: FlagSource,
}

/// Pure precedence resolution over already-fetched values.
pub fn resolve_effective(
    override_value: Option<bool>,
    tenant_persisted: Option<bool>,
    platform_persisted: Option<bool>,
) -> EffectiveFlag {
    if let Some(value) = override_value {
        return EffectiveFlag {
            value,
            source: FlagSource::Override,
        };
    }
    if let Some(value) = tenant_persisted {
        return EffectiveFlag {
            value,
            source: FlagSource::TenantFlag,
        };
    }
    if let Some(value) = platform_persisted {
        return EffectiveFlag {
            value,
            source: FlagSource::PlatformFlag,
        };
    }
    EffectiveFlag {
        value: false,
        source: FlagSource::Default,
    }
}

/// Process-wide runtime override map.
///
/// Built once at startup and injected wherever flags are resolved; no hidden
/// globals. Contents are lost on restart by contract.
#[derive(Debug, Default)]
pub struct OverrideStore {
    inner: RwLock<HashMap<(String, FlagScope), bool>>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, flag: &str, scope: FlagScope) -> Option<bool> {
        self.inner
            .read()
            .expect("override map lock poisoned")
            .get(&(flag.to_string(), scope))
            .copied()
    }

    /// Set an override. `None` clears it, reverting to persisted values.
    pub fn set(&self, flag: &str, scope: FlagScope, value: Option<bool>) {
        let mut map = self.inner.write().expect("override map lock poisoned");
        match value {
            Some(v) => {
                map.insert((flag.to_string(), scope), v);
            }
            None => {
                map.remove(&(flag.to_string(), scope));
            }
        }
    }

    /// Snapshot for the admin inspection endpoint.
    pub fn snapshot(&self) -> Vec<(String, FlagScope, bool)> {
        self.inner
            .read()
            .expect("override map lock poisoned")
            .iter()
            .map(|((name, scope), value)| (name.clone(), *scope, *value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_false_when_nothing_is_set() {
        let flag = resolve_effective(None, None, None);
        assert!(!flag.value);
        assert_eq!(flag.source, FlagSource::Default);
    }

    #[test]
    fn platform_flag_applies_when_tenant_has_none() {
        let flag = resolve_effective(None, None, Some(true));
        assert!(flag.value);
        assert_eq!(flag.source, FlagSource::PlatformFlag);
    }

    #[test]
    fn tenant_flag_beats_platform_flag() {
        let flag = resolve_effective(None, Some(false), Some(true));
        assert!(!flag.value);
        assert_eq!(flag.source, FlagSource::TenantFlag);
    }

    #[test]
    fn override_false_beats_persisted_true() {
        let flag = resolve_effective(Some(false), Some(true), Some(true));
        assert!(!flag.value);
        assert_eq!(flag.source, FlagSource::Override);
    }

    #[test]
    fn clearing_an_override_reverts_to_persisted() {
        let store = OverrideStore::new();
        let scope = FlagScope::Tenant(TenantId::new());

        store.set("checkout_v2", scope, Some(false));
        assert_eq!(store.get("checkout_v2", scope), Some(false));
        let flag = resolve_effective(store.get("checkout_v2", scope), Some(true), None);
        assert!(!flag.value);

        store.set("checkout_v2", scope, None);
        assert_eq!(store.get("checkout_v2", scope), None);
        let flag = resolve_effective(store.get("checkout_v2", scope), Some(true), None);
        assert!(flag.value);
        assert_eq!(flag.source, FlagSource::TenantFlag);
    }

    #[test]
    fn overrides_are_scoped_independently() {
        let store = OverrideStore::new();
        let tenant = FlagScope::Tenant(TenantId::new());

        store.set("search_v2", FlagScope::Platform, Some(true));
        assert_eq!(store.get("search_v2", FlagScope::Platform), Some(true));
        assert_eq!(store.get("search_v2", tenant), None);
    }

    #[test]
    fn snapshot_lists_active_overrides() {
        let store = OverrideStore::new();
        store.set("a", FlagScope::Platform, Some(true));
        store.set("b", FlagScope::Platform, Some(false));
        store.set("b", FlagScope::Platform, None);

        let snap = store.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].0, "a");
    }
}
