use std::sync::Arc;

use sqlx::PgPool;

use shopgrid_flags::OverrideStore;
use shopgrid_infra::{
    CatalogStore, DirectoryStore, FeaturedCache, FlagService, OrdersStore, TenantsStore,
};

/// Shared service container injected into every handler.
pub struct AppServices {
    pub tenants: TenantsStore,
    pub catalog: CatalogStore,
    pub orders: OrdersStore,
    pub directory: DirectoryStore,
    pub flags: FlagService,
    pub webhook_secret: String,
}

/// Wire the stores over one shared pool. The pool connects lazily, so this is
/// safe to call before the database is reachable.
pub fn build_services(pool: PgPool, webhook_secret: String) -> AppServices {
    let overrides = Arc::new(OverrideStore::new());
    let featured_cache = FeaturedCache::new();

    AppServices {
        tenants: TenantsStore::new(pool.clone()),
        catalog: CatalogStore::new(pool.clone()),
        orders: OrdersStore::new(pool.clone()),
        directory: DirectoryStore::new(pool.clone(), featured_cache),
        flags: FlagService::new(pool, overrides),
        webhook_secret,
    }
}
