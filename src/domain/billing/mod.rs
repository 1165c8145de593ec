//! Billing module - Credits, payment transactions, and remediation options.
//!
//! Credit and Transaction rows are owned exclusively by this subsystem; no
//! other component mutates them. Resources (events) are foreign entities
//! referenced only by id.

mod credit;
mod errors;
mod payment_option;
mod transaction;

pub use credit::{Credit, CreditStatus};
pub use errors::LedgerError;
pub use payment_option::PaymentOption;
pub use transaction::{Transaction, TransactionStatus};
