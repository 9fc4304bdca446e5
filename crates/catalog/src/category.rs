use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use storefront_core::CategoryId;

use crate::product::Product;

/// A product category. `name` is unique across the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Category joined with every product that references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithProducts {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

impl CategoryWithProducts {
    /// Join every category with the products that reference it.
    ///
    /// Category order and per-category product order follow the input order.
    /// Products whose category is not in `categories` are dropped.
    pub fn group(
        categories: impl IntoIterator<Item = Category>,
        products: impl IntoIterator<Item = Product>,
    ) -> Vec<Self> {
        let mut by_category: HashMap<CategoryId, Vec<Product>> = HashMap::new();
        for p in products {
            by_category.entry(p.category_id).or_default().push(p);
        }

        categories
            .into_iter()
            .map(|category| {
                let products = by_category.remove(&category.id).unwrap_or_default();
                Self { category, products }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::ProductId;

    fn product(id: i32, category: i32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("p{id}"),
            price: 1.0,
            image_url: "u".to_string(),
            variants: vec![],
            stock: 0,
            category_id: CategoryId::new(category),
        }
    }

    #[test]
    fn group_attaches_products_in_order() {
        let categories = vec![
            Category::new(CategoryId::new(1), "Apparel"),
            Category::new(CategoryId::new(2), "Shoes"),
            Category::new(CategoryId::new(3), "Empty"),
        ];
        let products = vec![product(1, 1), product(2, 2), product(3, 1), product(4, 99)];

        let joined = CategoryWithProducts::group(categories, products);

        assert_eq!(joined.len(), 3);
        let ids: Vec<i32> = joined[0].products.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(joined[1].products.len(), 1);
        assert!(joined[2].products.is_empty());
    }

    #[test]
    fn serializes_category_fields_next_to_products() {
        let joined = CategoryWithProducts::group(vec![Category::new(CategoryId::new(4), "Shoes")], vec![]);
        let json = serde_json::to_value(&joined[0]).unwrap();

        assert_eq!(json, serde_json::json!({ "id": 4, "name": "Shoes", "products": [] }));
    }
}
