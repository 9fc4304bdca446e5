//! Catalog domain module.
//!
//! This crate contains the catalog records (categories, products), their joined
//! read shapes, and the validated input for product creation. Pure domain logic:
//! no IO, no HTTP, no storage.

pub mod category;
pub mod product;

pub use category::{Category, CategoryWithProducts};
pub use product::{NewProduct, Product, ProductDraft, ProductWithCategory};

/// Client-facing message for a creation request missing a required field.
pub const MISSING_REQUIRED_FIELDS: &str = "Missing required fields";
