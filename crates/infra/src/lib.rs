//! `shopgrid-infra` — Postgres-backed stores and process-local caches.
//!
//! Every store takes a shared `PgPool` and includes `tenant_id` in each
//! tenant-scoped WHERE clause; uniqueness invariants (SKU, subdomain, webhook
//! event id) are enforced by database constraints and surfaced as conflicts.

pub mod cache;
pub mod catalog_store;
pub mod db;
pub mod directory_store;
pub mod error;
pub mod flags_store;
pub mod orders_store;
pub mod tenants_store;

pub use cache::FeaturedCache;
pub use catalog_store::{CatalogStore, ItemUpdate};
pub use db::{connect_pool, DbConfig};
pub use directory_store::{DirectoryStore, ViewRefresh};
pub use error::{violation_for_constraint, StoreError, UniqueViolation};
pub use flags_store::{FlagService, PersistedFlag};
pub use orders_store::{NewOrder, OrderDetails, OrderLineRecord, OrderRecord, OrdersStore};
pub use tenants_store::{TenantsStore, TenantUpdate};
