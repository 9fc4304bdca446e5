//! Postgres-backed catalog store.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique / foreign key / check violation) | `23505` / `23503` / `23514` | `Constraint` |
//! | Database (other) | Any other | `Database` |
//! | PoolClosed, PoolTimedOut, Io, Tls | N/A | `Unavailable` |
//! | ColumnDecode, ColumnNotFound, Decode | N/A | `Decode` |
//! | Other | N/A | `Database` |
//!
//! ## Atomicity
//!
//! Category get-or-create is a single `INSERT .. ON CONFLICT .. RETURNING`
//! statement. Product creation is a separate statement; the two are not
//! wrapped in a transaction.

use std::sync::Arc;

use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::instrument;

use storefront_catalog::{Category, CategoryWithProducts, NewProduct, Product, ProductWithCategory};
use storefront_core::{CategoryId, ProductId};

use super::r#trait::{CatalogStore, ProductFilter, StoreError};

/// Idempotent DDL for the catalog tables.
pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

const PRODUCT_COLUMNS: &str = r#"
    p.id,
    p.name,
    p.price,
    p."imageUrl" AS image_url,
    p.variants,
    p.stock,
    p."categoryId" AS category_id
"#;

/// Postgres-backed catalog store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and shared by all
/// in-flight requests.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    /// Wrap an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the catalog tables if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn apply_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("apply_schema", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductWithCategory>, StoreError> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, c.name AS category_name
            FROM "Product" p
            JOIN "Category" c ON c.id = p."categoryId"
            WHERE ($1::int4 IS NULL OR p."categoryId" = $1)
            ORDER BY p.id ASC
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(filter.category_id.map(i32::from))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter()
            .map(product_with_category_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_products", e))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get_product(&self, id: ProductId) -> Result<Option<ProductWithCategory>, StoreError> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, c.name AS category_name
            FROM "Product" p
            JOIN "Category" c ON c.id = p."categoryId"
            WHERE p.id = $1
            "#
        );

        let row = sqlx::query(&sql)
            .bind(i32::from(id))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;

        row.as_ref()
            .map(product_with_category_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_product", e))
    }

    #[instrument(skip(self), err)]
    async fn upsert_category(&self, name: &str) -> Result<Category, StoreError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query(
            r#"
            INSERT INTO "Category" (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            "#,
        )
        .bind(name)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_category", e))?;

        category_from_row(&row).map_err(|e| map_sqlx_error("upsert_category", e))
    }

    #[instrument(
        skip(self, product, category),
        fields(product_name = %product.name(), category_id = %category.id),
        err
    )]
    async fn insert_product(
        &self,
        product: NewProduct,
        category: &Category,
    ) -> Result<ProductWithCategory, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO "Product" (name, price, "imageUrl", variants, stock, "categoryId")
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(product.name())
        .bind(product.price())
        .bind(product.image_url())
        .bind(product.variants().to_vec())
        .bind(product.stock())
        .bind(i32::from(category.id))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        let id: i32 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("insert_product", e))?;

        Ok(ProductWithCategory::new(
            product.into_product(ProductId::new(id), category.id),
            category.clone(),
        ))
    }

    #[instrument(skip(self), err)]
    async fn list_categories(&self) -> Result<Vec<CategoryWithProducts>, StoreError> {
        let category_rows = sqlx::query(r#"SELECT id, name FROM "Category" ORDER BY id ASC"#)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_categories", e))?;

        let product_rows = sqlx::query(&format!(
            r#"SELECT {PRODUCT_COLUMNS} FROM "Product" p ORDER BY p.id ASC"#
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_categories", e))?;

        let categories = category_rows
            .iter()
            .map(category_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_categories", e))?;
        let products = product_rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_categories", e))?;

        Ok(CategoryWithProducts::group(categories, products))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category::new(
        CategoryId::new(row.try_get("id")?),
        row.try_get::<String, _>("name")?,
    ))
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        image_url: row.try_get("image_url")?,
        variants: row.try_get("variants")?,
        stock: row.try_get("stock")?,
        category_id: CategoryId::new(row.try_get("category_id")?),
    })
}

fn product_with_category_from_row(row: &PgRow) -> Result<ProductWithCategory, sqlx::Error> {
    let product = product_from_row(row)?;
    let category = Category::new(product.category_id, row.try_get::<String, _>("category_name")?);
    Ok(ProductWithCategory::new(product, category))
}

/// Map SQLx errors to `StoreError`, tagging the failing operation.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505" | "23503" | "23514") => StoreError::Constraint(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("timed out acquiring connection in {}", operation))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {}: {}", operation, e)),
        sqlx::Error::Tls(e) => StoreError::Unavailable(format!("tls error in {}: {}", operation, e)),
        e @ (sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_)) => StoreError::Decode(format!("{} in {}", e, operation)),
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}
