//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Billing Ports
//!
//! - `CreditLedger` - Issuance and exactly-once consumption of credits
//! - `ProductCatalog` - Read-only priced product lookup
//!
//! ## Collaborator Ports
//!
//! - `ResourceService` - The foreign event service (create/delete/get)
//! - `ClubService` - Club plan and membership lookups

mod club_service;
mod credit_ledger;
mod product_catalog;
mod resource_service;

pub use club_service::ClubService;
pub use credit_ledger::CreditLedger;
pub use product_catalog::ProductCatalog;
pub use resource_service::{NewResource, ResourceService, ResourceSummary};
