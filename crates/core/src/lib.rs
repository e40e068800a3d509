//! `shopgrid-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod pagination;

pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, ItemId, OrderId, TenantId};
pub use pagination::{PageRequest, Pagination, MAX_PAGE_LIMIT};
