//! Credit aggregate entity.
//!
//! A credit is a prepaid, single-use entitlement unit: one credit permits one
//! personal resource above the free limit, up to the cap of the product it
//! was purchased for. Credits are issued exactly once per completed payment
//! transaction and consumed exactly once against a persisted resource.
//!
//! # Design Decisions
//!
//! - **One credit per transaction**: Unique constraint on
//!   `source_transaction_id` enforced at database level
//! - **One-way lifecycle**: available → consumed; credits are never deleted
//!   and never reset
//! - **Binding invariant**: `Consumed` ⇔ `consumed_resource_id` and
//!   `consumed_at` are both set

use crate::domain::catalog::ProductCode;
use crate::domain::foundation::{CreditId, ResourceId, Timestamp, TransactionId, UserId};
use serde::{Deserialize, Serialize};

use super::LedgerError;

/// Lifecycle status of a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    /// Issued and spendable.
    Available,
    /// Spent against a persisted resource. Terminal.
    Consumed,
}

/// Credit aggregate - a single-use prepaid entitlement.
///
/// # Invariants
///
/// - `source_transaction_id` is unique across all credits
/// - `status == Consumed` ⇔ `consumed_resource_id.is_some() && consumed_at.is_some()`
/// - The available → consumed transition happens at most once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    /// Unique identifier for this credit.
    pub id: CreditId,

    /// User who owns this credit.
    pub user_id: UserId,

    /// Product code this credit represents (the "credit code").
    pub credit_code: ProductCode,

    /// The completed payment transaction that issued this credit.
    pub source_transaction_id: TransactionId,

    /// Current lifecycle status.
    pub status: CreditStatus,

    /// Resource the credit was consumed against, if consumed.
    pub consumed_resource_id: Option<ResourceId>,

    /// When the credit was consumed, if consumed.
    pub consumed_at: Option<Timestamp>,

    /// When the credit was issued.
    pub issued_at: Timestamp,
}

impl Credit {
    /// Issues a new available credit from a completed payment transaction.
    pub fn issue(
        id: CreditId,
        user_id: UserId,
        credit_code: ProductCode,
        source_transaction_id: TransactionId,
    ) -> Self {
        Self {
            id,
            user_id,
            credit_code,
            source_transaction_id,
            status: CreditStatus::Available,
            consumed_resource_id: None,
            consumed_at: None,
            issued_at: Timestamp::now(),
        }
    }

    /// Returns true if the credit can still be spent.
    pub fn is_available(&self) -> bool {
        self.status == CreditStatus::Available
    }

    /// Consumes this credit against a persisted resource.
    ///
    /// The transition sets the status, resource binding, and consumption time
    /// together so the binding invariant can never be observed half-applied.
    ///
    /// # Errors
    ///
    /// - `MissingConsumedResource` if the resource id is nil
    /// - `InvalidStateTransition` if the credit is not available
    pub fn consume(&mut self, resource_id: ResourceId) -> Result<(), LedgerError> {
        if resource_id.is_nil() {
            return Err(LedgerError::MissingConsumedResource);
        }
        if self.status != CreditStatus::Available {
            return Err(LedgerError::invalid_state("consumed", "consumed"));
        }

        self.status = CreditStatus::Consumed;
        self.consumed_resource_id = Some(resource_id);
        self.consumed_at = Some(Timestamp::now());
        Ok(())
    }
}
