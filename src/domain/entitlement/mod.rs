//! Entitlement module - Pure decision logic gating monetized actions.
//!
//! The policy decides, for every save attempt, whether the action is free,
//! needs explicit confirmation to spend a prepaid credit, or is rejected
//! with priced remediation options. It reads snapshots of catalog and
//! ledger state but never mutates either.

mod club_plan;
mod decision;
mod errors;
mod policy;

pub use club_plan::{ClubPlan, SubscriptionStatus};
pub use decision::EntitlementDecision;
pub use errors::{EntitlementError, PaywallReason, CONFIRMATION_REASON};
pub use policy::{
    decide_club_creation, decide_club_event, decide_csv_export, decide_member_add,
    decide_personal_event, ClubEventContext, PersonalEventContext,
};
