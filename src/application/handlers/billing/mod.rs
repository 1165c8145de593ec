//! Billing use cases.

mod issue_credit;
mod list_credits;

pub use issue_credit::{IssueCreditCommand, IssueCreditHandler, IssueCreditResult};
pub use list_credits::{ListAvailableCreditsHandler, ListAvailableCreditsQuery};
