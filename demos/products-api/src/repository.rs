//! In-memory product store. Good enough for a demo; the handlers only
//! depend on its async surface, so swapping in a database later means
//! replacing this module.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::schemas::{CreateProduct, ListFilter, Product, ProductPatch};

#[derive(Clone)]
pub struct ProductRepository {
    inner: Arc<RwLock<Store>>,
}

struct Store {
    next_id: u64,
    products: Vec<Product>,
}

impl ProductRepository {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Store {
                next_id: 1,
                products: Vec::new(),
            })),
        }
    }

    /// A repository pre-loaded with a few products, for the demo server
    /// and the tests.
    pub fn seeded() -> Self {
        let products = vec![
            Product {
                id: 1,
                name: "Desk lamp".to_string(),
                price: 34.5,
                categories: vec!["lighting".to_string(), "office".to_string()],
            },
            Product {
                id: 2,
                name: "Standing desk".to_string(),
                price: 429.0,
                categories: vec!["furniture".to_string(), "office".to_string()],
            },
        ];
        Self {
            inner: Arc::new(RwLock::new(Store {
                next_id: 3,
                products,
            })),
        }
    }

    pub async fn list(&self, filter: &ListFilter) -> Vec<Product> {
        let store = self.inner.read().await;
        store
            .products
            .iter()
            .filter(|product| {
                let name_ok = filter.name.as_deref().is_none_or(|needle| {
                    product.name.to_lowercase().contains(&needle.to_lowercase())
                });
                let categories_ok = filter.categories.as_deref().is_none_or(|wanted| {
                    wanted.iter().any(|c| product.categories.contains(c))
                });
                name_ok && categories_ok
            })
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: u64) -> Option<Product> {
        let store = self.inner.read().await;
        store.products.iter().find(|p| p.id == id).cloned()
    }

    pub async fn create(&self, input: CreateProduct) -> Product {
        let mut store = self.inner.write().await;
        let product = Product {
            id: store.next_id,
            name: input.name,
            price: input.price,
            categories: input.categories,
        };
        store.next_id += 1;
        store.products.push(product.clone());
        product
    }

    pub async fn update(&self, id: u64, patch: ProductPatch) -> Option<Product> {
        let mut store = self.inner.write().await;
        let product = store.products.iter_mut().find(|p| p.id == id)?;
        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(categories) = patch.categories {
            product.categories = categories;
        }
        Some(product.clone())
    }

    pub async fn delete(&self, id: u64) -> bool {
        let mut store = self.inner.write().await;
        let before = store.products.len();
        store.products.retain(|p| p.id != id);
        store.products.len() != before
    }
}

impl Default for ProductRepository {
    fn default() -> Self {
        Self::new()
    }
}
