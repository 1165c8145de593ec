//! PostgreSQL adapters backed by sqlx.

mod credit_ledger;
mod product_catalog;

pub use credit_ledger::PostgresCreditLedger;
pub use product_catalog::PostgresProductCatalog;
