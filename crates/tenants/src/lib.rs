//! `shopgrid-tenants` — tenant (store) domain model.

pub mod gdpr;
pub mod tenant;

pub use gdpr::{ErasureAudit, ErasureReceipt, GdprExportBundle};
pub use tenant::{
    validate_subdomain, LocationStatus, NewTenant, SubscriptionTier, TenantRecord, TenantStatus,
};
