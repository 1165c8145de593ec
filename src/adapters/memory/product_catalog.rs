//! In-memory product catalog, seedable for tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::catalog::{CurrencyCode, Price, Product, ProductCode, ProductConstraints};
use crate::domain::foundation::DomainError;
use crate::ports::ProductCatalog;

#[derive(Default)]
pub struct InMemoryProductCatalog {
    products: Mutex<HashMap<String, Product>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-seeded with the standard event upgrade product.
    pub fn with_standard_products() -> Self {
        let catalog = Self::new();
        catalog.insert(Product {
            code: ProductCode::new("EVENT_UPGRADE_500").expect("valid product code"),
            price: Price::new(49_00, CurrencyCode::Eur),
            constraints: ProductConstraints {
                max_participants: Some(500),
                max_club_members: None,
            },
        });
        catalog
    }

    pub fn insert(&self, product: Product) {
        self.products
            .lock()
            .expect("catalog lock poisoned")
            .insert(product.code.as_str().to_string(), product);
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn get_product(&self, code: &ProductCode) -> Result<Option<Product>, DomainError> {
        let products = self.products.lock().expect("catalog lock poisoned");
        Ok(products.get(code.as_str()).cloned())
    }
}
