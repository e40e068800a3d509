//! `shopgrid-catalog` — inventory/catalog domain model.

pub mod category;
pub mod item;

pub use category::CategoryProductCount;
pub use item::{validate_sku, ItemRecord, ItemStatus, ItemVisibility, NewItem};
