//! Payment transaction records.
//!
//! Transactions are created and driven to a terminal state by the
//! out-of-scope payment flow. This crate consumes them read-only: a
//! transaction in `Completed` status is the one and only trigger for credit
//! issuance.

use crate::domain::catalog::{Price, ProductCode};
use crate::domain::foundation::{Timestamp, TransactionId, UserId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a payment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Payment initiated, outcome unknown.
    Pending,
    /// Payment settled. Terminal; triggers credit issuance.
    Completed,
    /// Payment failed. Terminal.
    Failed,
    /// Payment refunded after completion. Terminal.
    Refunded,
}

impl TransactionStatus {
    /// Returns true if the status is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// A payment transaction, owned by the billing subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Paying user.
    pub user_id: UserId,
    /// Product this payment purchases.
    pub product_code: ProductCode,
    /// Settled amount.
    pub amount: Price,
    /// Current lifecycle status.
    pub status: TransactionStatus,
    /// Payment provider identifier (e.g. "stripe").
    pub provider: String,
    /// When the transaction was created.
    pub created_at: Timestamp,
}

impl Transaction {
    /// Returns true if this transaction may issue a credit.
    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}
