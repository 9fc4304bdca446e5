use std::sync::Arc;

use thiserror::Error;

use storefront_catalog::{Category, CategoryWithProducts, NewProduct, ProductWithCategory};
use storefront_core::{CategoryId, ProductId};

/// Failure of a catalog store operation.
///
/// Callers are expected to log these and report a generic failure; the
/// message may contain database detail that must not reach clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("failed to decode row: {0}")]
    Decode(String),

    #[error("database error: {0}")]
    Database(String),
}

/// Optional narrowing for product listings.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
}

impl ProductFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_category(category_id: CategoryId) -> Self {
        Self {
            category_id: Some(category_id),
        }
    }
}

/// Data-access operations backing the catalog API.
///
/// Each method is a single store round-trip (or one logical query); no method
/// spans a multi-step transaction. Listing order is by ascending id.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// List products (each joined with its category), optionally by category.
    async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductWithCategory>, StoreError>;

    /// Look up one product (joined with its category) by primary key.
    async fn get_product(&self, id: ProductId) -> Result<Option<ProductWithCategory>, StoreError>;

    /// Get-or-create a category by exact name.
    ///
    /// Must be atomic for the single row: concurrent callers with the same
    /// name observe the same category id.
    async fn upsert_category(&self, name: &str) -> Result<Category, StoreError>;

    /// Insert a product under an already-resolved category.
    async fn insert_product(
        &self,
        product: NewProduct,
        category: &Category,
    ) -> Result<ProductWithCategory, StoreError>;

    /// List all categories, each joined with all of its products.
    async fn list_categories(&self) -> Result<Vec<CategoryWithProducts>, StoreError>;

    /// Release backing resources (connection pools). Default: nothing to release.
    async fn close(&self) {}
}

#[async_trait::async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductWithCategory>, StoreError> {
        (**self).list_products(filter).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<ProductWithCategory>, StoreError> {
        (**self).get_product(id).await
    }

    async fn upsert_category(&self, name: &str) -> Result<Category, StoreError> {
        (**self).upsert_category(name).await
    }

    async fn insert_product(
        &self,
        product: NewProduct,
        category: &Category,
    ) -> Result<ProductWithCategory, StoreError> {
        (**self).insert_product(product, category).await
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithProducts>, StoreError> {
        (**self).list_categories().await
    }

    async fn close(&self) {
        (**self).close().await
    }
}
