//! Product catalog port.
//!
//! Read-only lookup of priced products and their constraints. The catalog
//! is the single source of truth for prices and limits; every value
//! surfaced in a rejection is read here at decision time so a price change
//! takes effect without a deploy.

use crate::domain::catalog::{Product, ProductCode};
use crate::domain::foundation::DomainError;
use async_trait::async_trait;

/// Port for product lookups.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Find a product by its code.
    ///
    /// Returns `None` if no such product exists.
    async fn get_product(&self, code: &ProductCode) -> Result<Option<Product>, DomainError>;
}
