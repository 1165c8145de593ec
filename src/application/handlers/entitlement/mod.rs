//! Entitlement use cases.

mod enforce_entitlement;
mod save_with_credit;

pub use enforce_entitlement::{
    EnforceEntitlementCommand, EnforceEntitlementHandler, PolicySettings,
};
pub use save_with_credit::{
    CreatedResource, CreditSaveOutcome, CreditTransactionOrchestrator,
};
