use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use storefront_catalog::{Category, CategoryWithProducts, NewProduct, Product, ProductWithCategory};
use storefront_core::{CategoryId, ProductId};

use super::r#trait::{CatalogStore, ProductFilter, StoreError};

#[derive(Debug, Default)]
struct Tables {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    last_category_id: i32,
    last_product_id: i32,
}

impl Tables {
    fn join(&self, product: &Product) -> Result<ProductWithCategory, StoreError> {
        let category = self.categories.get(&product.category_id).ok_or_else(|| {
            StoreError::Constraint(format!(
                "product {} references missing category {}",
                product.id, product.category_id
            ))
        })?;
        Ok(ProductWithCategory::new(product.clone(), category.clone()))
    }
}

/// In-memory catalog store.
///
/// Intended for tests/dev. Ids are assigned sequentially starting at 1, like
/// serial columns. All mutations happen under a single write lock.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    tables: RwLock<Tables>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductWithCategory>, StoreError> {
        let tables = self.read()?;
        tables
            .products
            .values()
            .filter(|p| filter.category_id.is_none_or(|c| p.category_id == c))
            .map(|p| tables.join(p))
            .collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<ProductWithCategory>, StoreError> {
        let tables = self.read()?;
        tables.products.get(&id).map(|p| tables.join(p)).transpose()
    }

    async fn upsert_category(&self, name: &str) -> Result<Category, StoreError> {
        let mut tables = self.write()?;
        if let Some(existing) = tables.categories.values().find(|c| c.name == name) {
            return Ok(existing.clone());
        }

        tables.last_category_id += 1;
        let category = Category::new(CategoryId::new(tables.last_category_id), name);
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn insert_product(
        &self,
        product: NewProduct,
        category: &Category,
    ) -> Result<ProductWithCategory, StoreError> {
        let mut tables = self.write()?;
        let stored_category = tables.categories.get(&category.id).cloned().ok_or_else(|| {
            StoreError::Constraint(format!("category {} does not exist", category.id))
        })?;

        tables.last_product_id += 1;
        let product = product.into_product(ProductId::new(tables.last_product_id), stored_category.id);
        tables.products.insert(product.id, product.clone());
        Ok(ProductWithCategory::new(product, stored_category))
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithProducts>, StoreError> {
        let tables = self.read()?;
        Ok(CategoryWithProducts::group(
            tables.categories.values().cloned(),
            tables.products.values().cloned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use storefront_catalog::ProductDraft;

    use super::*;

    fn draft(name: &str, category: &str) -> NewProduct {
        NewProduct::try_from(ProductDraft {
            name: Some(name.to_string()),
            price: Some(10.0),
            image_url: Some(format!("https://img.example/{name}.png")),
            category_name: Some(category.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    async fn create(store: &InMemoryCatalogStore, name: &str, category: &str) -> ProductWithCategory {
        let np = draft(name, category);
        let category = store.upsert_category(np.category_name()).await.unwrap();
        store.insert_product(np, &category).await.unwrap()
    }

    #[tokio::test]
    async fn upsert_category_reuses_existing_name() {
        let store = InMemoryCatalogStore::new();

        let first = store.upsert_category("Apparel").await.unwrap();
        let again = store.upsert_category("Apparel").await.unwrap();
        let other = store.upsert_category("apparel").await.unwrap();

        assert_eq!(first, again);
        assert_ne!(first.id, other.id);
        assert_eq!(store.list_categories().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn assigns_sequential_ids_from_one() {
        let store = InMemoryCatalogStore::new();

        let a = create(&store, "Tee", "Apparel").await;
        let b = create(&store, "Cap", "Apparel").await;

        assert_eq!(a.product.id, ProductId::new(1));
        assert_eq!(b.product.id, ProductId::new(2));
        assert_eq!(a.category.id, CategoryId::new(1));
        assert_eq!(b.category.id, a.category.id);
    }

    #[tokio::test]
    async fn list_products_filters_by_category() {
        let store = InMemoryCatalogStore::new();
        let tee = create(&store, "Tee", "Apparel").await;
        create(&store, "Boot", "Shoes").await;

        let all = store.list_products(ProductFilter::all()).await.unwrap();
        assert_eq!(all.len(), 2);

        let apparel = store
            .list_products(ProductFilter::by_category(tee.category.id))
            .await
            .unwrap();
        assert_eq!(apparel, vec![tee]);

        let none = store
            .list_products(ProductFilter::by_category(CategoryId::new(404)))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn get_product_returns_none_for_unknown_id() {
        let store = InMemoryCatalogStore::new();
        let tee = create(&store, "Tee", "Apparel").await;

        let found = store.get_product(tee.product.id).await.unwrap().unwrap();
        assert_eq!(found.category.id, found.product.category_id);
        assert!(store.get_product(ProductId::new(999_999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_product_requires_existing_category() {
        let store = InMemoryCatalogStore::new();
        let ghost = Category::new(CategoryId::new(77), "Ghost");

        let err = store.insert_product(draft("Tee", "Ghost"), &ghost).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert!(store.list_products(ProductFilter::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_categories_embeds_products() {
        let store = InMemoryCatalogStore::new();
        create(&store, "Tee", "Apparel").await;
        create(&store, "Cap", "Apparel").await;
        store.upsert_category("Empty").await.unwrap();

        let categories = store.list_categories().await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].category.name, "Apparel");
        assert_eq!(categories[0].products.len(), 2);
        assert!(categories[1].products.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_upserts_create_one_category() {
        let store = Arc::new(InMemoryCatalogStore::new());

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.upsert_category("Apparel").await.unwrap().id
            }));
        }

        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.list_categories().await.unwrap().len(), 1);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 64,
                ..ProptestConfig::default()
            })]

            /// Property: repeated creation never yields two categories with the same name.
            #[test]
            fn category_names_stay_unique(names in proptest::collection::vec("[A-C]", 1..20)) {
                let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
                rt.block_on(async {
                    let store = InMemoryCatalogStore::new();
                    for (i, category) in names.iter().enumerate() {
                        create(&store, &format!("p{i}"), category).await;
                    }

                    let categories = store.list_categories().await.unwrap();
                    let mut seen: Vec<&str> = categories.iter().map(|c| c.category.name.as_str()).collect();
                    let total = seen.len();
                    seen.sort_unstable();
                    seen.dedup();
                    assert_eq!(seen.len(), total);

                    let products: usize = categories.iter().map(|c| c.products.len()).sum();
                    assert_eq!(products, names.len());
                });
            }
        }
    }
}
