//! Entitlement decision signals and paywall taxonomy.
//!
//! The policy surfaces two typed non-success outcomes besides real faults:
//!
//! - [`EntitlementError::ConfirmationRequired`] (HTTP 409) - not a failure
//!   from the user's perspective, but a required interaction step before a
//!   non-reversible credit spend
//! - [`EntitlementError::PaymentRequired`] (HTTP 402) - a business-rule
//!   rejection that always carries a machine-actionable reason and zero or
//!   more priced remediation options
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ConfirmationRequired | 409 |
//! | PaymentRequired | 402 |
//! | Infrastructure | 500 |

use crate::domain::billing::PaymentOption;
use crate::domain::catalog::ProductCode;
use crate::domain::foundation::ResourceId;
use serde::{Deserialize, Serialize};

/// Machine-readable reason attached to every paywall rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaywallReason {
    /// Publishing above the free limit requires a payment.
    PublishRequiresPayment,
    /// The event exceeds what a single credit can unlock.
    ClubRequiredForLargeEvent,
    /// Consumption was attempted with no available credit.
    NoCreditAvailable,
    /// Paid (ticketed) events are not allowed for this account or plan.
    PaidEventsNotAllowed,
    /// Requested participants exceed the club plan's event cap.
    MaxEventParticipantsExceeded,
    /// Adding the member would exceed the club plan's member cap.
    MaxClubMembersExceeded,
    /// The club's subscription is not active.
    SubscriptionNotActive,
    /// The club's subscription period has ended.
    SubscriptionExpired,
    /// CSV export is not included in the club's plan.
    CsvExportNotAllowed,
    /// Creating a club requires purchasing a club plan.
    ClubCreationRequiresPlan,
}

impl PaywallReason {
    /// Returns the wire-format reason code.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaywallReason::PublishRequiresPayment => "PUBLISH_REQUIRES_PAYMENT",
            PaywallReason::ClubRequiredForLargeEvent => "CLUB_REQUIRED_FOR_LARGE_EVENT",
            PaywallReason::NoCreditAvailable => "NO_CREDIT_AVAILABLE",
            PaywallReason::PaidEventsNotAllowed => "PAID_EVENTS_NOT_ALLOWED",
            PaywallReason::MaxEventParticipantsExceeded => "MAX_EVENT_PARTICIPANTS_EXCEEDED",
            PaywallReason::MaxClubMembersExceeded => "MAX_CLUB_MEMBERS_EXCEEDED",
            PaywallReason::SubscriptionNotActive => "SUBSCRIPTION_NOT_ACTIVE",
            PaywallReason::SubscriptionExpired => "SUBSCRIPTION_EXPIRED",
            PaywallReason::CsvExportNotAllowed => "CSV_EXPORT_NOT_ALLOWED",
            PaywallReason::ClubCreationRequiresPlan => "CLUB_CREATION_REQUIRES_PLAN",
        }
    }
}

impl std::fmt::Display for PaywallReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reason code carried by the confirmation-required signal.
pub const CONFIRMATION_REASON: &str = "EVENT_UPGRADE_WILL_BE_CONSUMED";

/// Non-success outcomes of an entitlement decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitlementError {
    /// The save would spend a credit and the caller has not confirmed yet.
    ///
    /// Carries everything the caller needs to render a confirmation step and
    /// resubmit with `confirm_credit=1`.
    ConfirmationRequired {
        credit_code: ProductCode,
        resource_id: Option<ResourceId>,
        requested_participants: u32,
    },

    /// The save is rejected until a payment is made.
    PaymentRequired {
        reason: PaywallReason,
        options: Vec<PaymentOption>,
        current_plan_id: Option<String>,
        required_plan_id: Option<String>,
    },

    /// Storage or collaborator failure while gathering decision inputs.
    Infrastructure(String),
}

impl EntitlementError {
    pub fn confirmation_required(
        credit_code: ProductCode,
        resource_id: Option<ResourceId>,
        requested_participants: u32,
    ) -> Self {
        EntitlementError::ConfirmationRequired {
            credit_code,
            resource_id,
            requested_participants,
        }
    }

    pub fn payment_required(reason: PaywallReason, options: Vec<PaymentOption>) -> Self {
        EntitlementError::PaymentRequired {
            reason,
            options,
            current_plan_id: None,
            required_plan_id: None,
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        EntitlementError::Infrastructure(message.into())
    }

    /// Attaches the plan the club currently holds.
    pub fn with_current_plan(mut self, plan_id: impl Into<String>) -> Self {
        if let EntitlementError::PaymentRequired {
            ref mut current_plan_id,
            ..
        } = self
        {
            *current_plan_id = Some(plan_id.into());
        }
        self
    }

    /// Attaches the plan that would lift the rejection.
    pub fn with_required_plan(mut self, plan_id: impl Into<String>) -> Self {
        if let EntitlementError::PaymentRequired {
            ref mut required_plan_id,
            ..
        } = self
        {
            *required_plan_id = Some(plan_id.into());
        }
        self
    }

    /// Returns the paywall reason, if this is a payment-required rejection.
    pub fn paywall_reason(&self) -> Option<PaywallReason> {
        match self {
            EntitlementError::PaymentRequired { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntitlementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntitlementError::ConfirmationRequired {
                credit_code,
                requested_participants,
                ..
            } => write!(
                f,
                "Saving with {} participants will consume a {} credit; confirmation required",
                requested_participants, credit_code
            ),
            EntitlementError::PaymentRequired { reason, .. } => {
                write!(f, "Payment required: {}", reason)
            }
            EntitlementError::Infrastructure(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for EntitlementError {}
