//! Credit ledger error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NoCreditAvailable | 402 |
//! | DuplicateIssuance | 409 (or swallowed as already-issued) |
//! | MissingConsumedResource | 500 |
//! | InvalidStateTransition | 500 |
//! | Infrastructure | 500 |

use crate::domain::catalog::ProductCode;
use crate::domain::foundation::{ErrorCode, TransactionId};

/// Errors raised by the credit ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No available credit exists for the user and credit code.
    ///
    /// A business outcome, not a server fault: it is the expected result of
    /// concurrent retries losing the atomic claim, and maps to
    /// payment-required at the API boundary.
    NoCreditAvailable { credit_code: ProductCode },

    /// A credit was already issued for this transaction.
    ///
    /// Raised on the unique `source_transaction_id` constraint so that
    /// duplicate delivery of a payment confirmation is distinguishable from
    /// a real failure; issuance callers treat it as "already issued".
    DuplicateIssuance {
        source_transaction_id: TransactionId,
    },

    /// Consumption was attempted without a persisted resource to bind to.
    ///
    /// A programmer error: the consumption record must reference an existing
    /// resource. Implementations fail with this before touching storage, and
    /// it is never reported as `NoCreditAvailable`.
    MissingConsumedResource,

    /// A credit was asked to make a transition its status does not allow
    /// (e.g. consuming an already-consumed credit directly).
    InvalidStateTransition { current: String, attempted: String },

    /// Storage or other infrastructure failure.
    Infrastructure(String),
}

impl LedgerError {
    pub fn no_credit_available(credit_code: ProductCode) -> Self {
        LedgerError::NoCreditAvailable { credit_code }
    }

    pub fn duplicate_issuance(source_transaction_id: TransactionId) -> Self {
        LedgerError::DuplicateIssuance {
            source_transaction_id,
        }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        LedgerError::InvalidStateTransition {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        LedgerError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            LedgerError::NoCreditAvailable { .. } => ErrorCode::CreditNotFound,
            LedgerError::DuplicateIssuance { .. } => ErrorCode::InvalidStateTransition,
            LedgerError::MissingConsumedResource => ErrorCode::PreconditionViolated,
            LedgerError::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
            LedgerError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a human-readable message.
    pub fn message(&self) -> String {
        match self {
            LedgerError::NoCreditAvailable { credit_code } => {
                format!("No available credit of type {}", credit_code)
            }
            LedgerError::DuplicateIssuance {
                source_transaction_id,
            } => format!(
                "A credit was already issued for transaction {}",
                source_transaction_id
            ),
            LedgerError::MissingConsumedResource => {
                "A credit cannot be consumed without a persisted resource id".to_string()
            }
            LedgerError::InvalidStateTransition { current, attempted } => {
                format!("Cannot transition credit from {} to {}", current, attempted)
            }
            LedgerError::Infrastructure(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for LedgerError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> ProductCode {
        ProductCode::new("EVENT_UPGRADE_500").unwrap()
    }

    #[test]
    fn no_credit_available_names_credit_code() {
        let err = LedgerError::no_credit_available(code());
        assert!(err.message().contains("EVENT_UPGRADE_500"));
    }

    #[test]
    fn missing_resource_is_a_precondition_violation() {
        let err = LedgerError::MissingConsumedResource;
        assert_eq!(err.code(), ErrorCode::PreconditionViolated);
        // Must never be confused with the business-rule failure.
        assert_ne!(err, LedgerError::no_credit_available(code()));
    }

    #[test]
    fn duplicate_issuance_names_transaction() {
        let tx = TransactionId::new();
        let err = LedgerError::duplicate_issuance(tx);
        assert!(err.message().contains(&tx.to_string()));
    }

    #[test]
    fn display_includes_error_code() {
        let err = LedgerError::infrastructure("pool exhausted");
        assert_eq!(format!("{}", err), "[DATABASE_ERROR] pool exhausted");
    }
}
