use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, DomainResult, ProductId};

use crate::category::Category;
use crate::MISSING_REQUIRED_FIELDS;

/// A catalog product as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub image_url: String,
    pub variants: Vec<String>,
    pub stock: i32,
    pub category_id: CategoryId,
}

/// Product joined with the category it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
}

impl ProductWithCategory {
    pub fn new(product: Product, category: Category) -> Self {
        debug_assert_eq!(product.category_id, category.id);
        Self { product, category }
    }
}

/// Unvalidated creation input, as received from a client.
///
/// Every field is optional here; [`NewProduct::try_from`] decides what is
/// required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub variants: Option<Vec<String>>,
    pub stock: Option<i64>,
    pub category_name: Option<String>,
}

/// Validated input for creating a product.
///
/// `category_name` is resolved to a category id by the store (get-or-create).
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    name: String,
    price: f64,
    image_url: String,
    variants: Vec<String>,
    stock: i32,
    category_name: String,
}

impl NewProduct {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn stock(&self) -> i32 {
        self.stock
    }

    pub fn category_name(&self) -> &str {
        &self.category_name
    }

    /// Build the stored product once the store has assigned ids.
    pub fn into_product(self, id: ProductId, category_id: CategoryId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            image_url: self.image_url,
            variants: self.variants,
            stock: self.stock,
            category_id,
        }
    }
}

fn required_text(value: Option<String>) -> DomainResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::validation(MISSING_REQUIRED_FIELDS)),
    }
}

impl TryFrom<ProductDraft> for NewProduct {
    type Error = DomainError;

    fn try_from(draft: ProductDraft) -> DomainResult<Self> {
        // Empty strings and a zero price count as missing.
        let name = required_text(draft.name)?;
        let image_url = required_text(draft.image_url)?;
        let category_name = required_text(draft.category_name)?;
        let price = match draft.price {
            None => return Err(DomainError::validation(MISSING_REQUIRED_FIELDS)),
            Some(p) if p == 0.0 => return Err(DomainError::validation(MISSING_REQUIRED_FIELDS)),
            Some(p) if !p.is_finite() => return Err(DomainError::validation("Invalid price")),
            Some(p) => p,
        };

        let stock = match draft.stock {
            None => 0,
            Some(s) => i32::try_from(s)
                .ok()
                .filter(|s| *s >= 0)
                .ok_or_else(|| DomainError::validation("Invalid stock"))?,
        };

        Ok(Self {
            name,
            price,
            image_url,
            variants: draft.variants.unwrap_or_default(),
            stock,
            category_name,
        })
    }
}
