//! Catalog module - Priced products and their constraints.

mod product;

pub use product::{CurrencyCode, Price, Product, ProductCode, ProductConstraints};
