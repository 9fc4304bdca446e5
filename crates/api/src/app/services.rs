use std::sync::Arc;

use storefront_catalog::{CategoryWithProducts, NewProduct, ProductWithCategory};
use storefront_core::{CategoryId, ProductId};
use storefront_infra::{
    CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, ProductFilter, StoreError,
};

use crate::config::ApiConfig;

/// Which backend the services were wired against (for logs).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres,
}

/// Everything the handlers need, built once at startup and shared by all
/// requests.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn CatalogStore>,
    backend: StoreBackend,
}

impl AppServices {
    pub fn new(store: Arc<dyn CatalogStore>, backend: StoreBackend) -> Self {
        Self { store, backend }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryCatalogStore::new()), StoreBackend::InMemory)
    }

    pub fn backend(&self) -> StoreBackend {
        self.backend
    }

    pub async fn list_products(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<ProductWithCategory>, StoreError> {
        let filter = match category_id {
            Some(id) => ProductFilter::by_category(id),
            None => ProductFilter::all(),
        };
        self.store.list_products(filter).await
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Option<ProductWithCategory>, StoreError> {
        self.store.get_product(id).await
    }

    /// Get-or-create the category, then insert the product under it.
    ///
    /// The two steps are not transactional: if the insert fails, a category
    /// created by the first step stays behind.
    pub async fn create_product(&self, product: NewProduct) -> Result<ProductWithCategory, StoreError> {
        let category = self.store.upsert_category(product.category_name()).await?;
        self.store.insert_product(product, &category).await
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryWithProducts>, StoreError> {
        self.store.list_categories().await
    }

    /// Release the store (closes the Postgres pool).
    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}

pub async fn build_services(config: &ApiConfig) -> Result<AppServices, StoreError> {
    if !config.use_persistent_stores {
        tracing::warn!("USE_PERSISTENT_STORES is off; catalog data lives in memory only");
        return Ok(AppServices::in_memory());
    }

    build_persistent_services(config).await
}

async fn build_persistent_services(config: &ApiConfig) -> Result<AppServices, StoreError> {
    let database_url = config.database_url.as_deref().ok_or_else(|| {
        StoreError::Unavailable("DATABASE_URL is not configured".to_string())
    })?;

    let store = PostgresCatalogStore::connect(database_url, config.max_connections).await?;
    if config.apply_schema {
        store.apply_schema().await?;
    }

    tracing::info!(max_connections = config.max_connections, "connected to postgres");
    Ok(AppServices::new(Arc::new(store), StoreBackend::Postgres))
}
