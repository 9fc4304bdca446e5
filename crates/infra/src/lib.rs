//! Infrastructure layer: catalog persistence (Postgres + in-memory).

pub mod catalog_store;

pub use catalog_store::{
    CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, ProductFilter, StoreError,
};
