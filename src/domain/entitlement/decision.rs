//! Successful entitlement decision result.

use serde::{Deserialize, Serialize};

/// Outcome of a successful entitlement evaluation.
///
/// `requires_credit: true` means the save is allowed on the condition that a
/// credit is consumed for it; the actual consumption is performed by the
/// credit transaction orchestrator, never by the policy itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementDecision {
    /// Whether completing the save must consume a credit.
    pub requires_credit: bool,
}

impl EntitlementDecision {
    /// The save is free: no credit involved.
    pub fn allowed() -> Self {
        Self {
            requires_credit: false,
        }
    }

    /// The save is allowed once a credit is consumed for it.
    pub fn with_credit() -> Self {
        Self {
            requires_credit: true,
        }
    }
}
