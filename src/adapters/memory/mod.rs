//! In-memory adapters for tests and local development.

mod club_service;
mod credit_ledger;
mod product_catalog;
mod resource_service;

pub use club_service::StaticClubService;
pub use credit_ledger::InMemoryCreditLedger;
pub use product_catalog::InMemoryProductCatalog;
pub use resource_service::InMemoryResourceService;
