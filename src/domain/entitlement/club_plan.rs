//! Club plan reference data.
//!
//! A club's plan is external reference data read by the entitlement policy
//! when a resource is club-scoped. Club-scoped saves are gated by plan limits
//! alone and never touch the credit ledger.

use serde::{Deserialize, Serialize};

/// Subscription state of a club's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid up and in period.
    Active,
    /// Created but never activated, or cancelled mid-period.
    Inactive,
    /// Period ended without renewal.
    Expired,
}

/// Limits granted by a club's current plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubPlan {
    /// Plan identifier, surfaced as `currentPlanId` in rejections.
    pub plan_id: String,

    /// Subscription state; only `Active` plans grant anything.
    pub subscription: SubscriptionStatus,

    /// Maximum participants per club event. None = unlimited.
    pub max_event_participants: Option<u32>,

    /// Maximum club members. None = unlimited.
    pub max_members: Option<u32>,

    /// Whether the club may publish paid (ticketed) events.
    pub allow_paid_events: bool,

    /// Whether the club may export attendee lists as CSV.
    pub allow_csv_export: bool,
}

impl ClubPlan {
    /// Returns true if the event participant cap is exceeded.
    pub fn event_participants_exceeded(&self, requested: u32) -> bool {
        self.max_event_participants
            .map(|max| requested > max)
            .unwrap_or(false)
    }

    /// Returns true if adding one more member would exceed the member cap.
    pub fn member_limit_reached(&self, current_members: u32) -> bool {
        self.max_members
            .map(|max| current_members >= max)
            .unwrap_or(false)
    }
}
