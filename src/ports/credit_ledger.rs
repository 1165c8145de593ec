//! Credit ledger port.
//!
//! Owns the lifecycle of purchasable entitlement units: issuance from a
//! completed payment, availability queries, and exactly-once consumption
//! tied to a persisted resource id.
//!
//! # Design
//!
//! - **Idempotent issuance**: At most one credit per source transaction,
//!   enforced by storage; duplicates fail distinguishably
//! - **Atomic claim**: `consume` is a single conditional state transition,
//!   never a read-then-write sequence, so concurrent retries yield exactly
//!   one consumption
//! - **Append-only**: Credits are never deleted and never reset

use crate::domain::billing::{Credit, LedgerError};
use crate::domain::catalog::ProductCode;
use crate::domain::foundation::{ResourceId, TransactionId, UserId};
use async_trait::async_trait;

/// Port for the credit ledger.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Issue a new available credit from a completed payment transaction.
    ///
    /// Idempotent on `source_transaction_id`: a second call with the same
    /// transaction id must not create a second credit.
    ///
    /// # Errors
    ///
    /// - `DuplicateIssuance` if a credit already exists for the transaction
    /// - `Infrastructure` on persistence failure
    async fn issue(
        &self,
        user_id: UserId,
        credit_code: &ProductCode,
        source_transaction_id: TransactionId,
    ) -> Result<Credit, LedgerError>;

    /// Whether the user holds at least one available credit of this code.
    async fn has_available(
        &self,
        user_id: UserId,
        credit_code: &ProductCode,
    ) -> Result<bool, LedgerError>;

    /// All available credits of this code held by the user, oldest first.
    async fn list_available(
        &self,
        user_id: UserId,
        credit_code: &ProductCode,
    ) -> Result<Vec<Credit>, LedgerError>;

    /// Atomically claim one available credit and bind it to the resource.
    ///
    /// Under N concurrent calls for a user holding exactly one available
    /// credit, exactly one call succeeds and the rest observe
    /// `NoCreditAvailable`.
    ///
    /// # Errors
    ///
    /// - `MissingConsumedResource` if `resource_id` is nil - a programmer
    ///   error raised before any storage mutation, never to be confused
    ///   with the business failure below
    /// - `NoCreditAvailable` if the user holds no available credit - an
    ///   expected business outcome mapping to payment-required
    /// - `Infrastructure` on persistence failure
    async fn consume(
        &self,
        user_id: UserId,
        credit_code: &ProductCode,
        resource_id: ResourceId,
    ) -> Result<Credit, LedgerError>;

    /// The credit consumed against this resource, if any.
    ///
    /// The ledger is the source of truth for the idempotent re-save check.
    async fn find_consumed_for_resource(
        &self,
        resource_id: ResourceId,
    ) -> Result<Option<Credit>, LedgerError>;
}
