//! Catalog store boundary.
//!
//! This module defines the data-access abstraction the API calls into, plus
//! two backends: an in-memory store (dev/tests) and a Postgres store.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use r#trait::{CatalogStore, ProductFilter, StoreError};
