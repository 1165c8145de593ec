//! IssueCreditHandler - turn a completed payment into a prepaid credit.
//!
//! Invoked when the payment provider confirms a transaction. Confirmation
//! delivery is at-least-once, so issuance is idempotent on the source
//! transaction: a redelivered confirmation reports `already_issued` instead
//! of minting a second credit.

use std::sync::Arc;

use crate::domain::billing::{Credit, LedgerError, Transaction};
use crate::ports::CreditLedger;

/// Command to issue a credit from a payment transaction.
#[derive(Debug, Clone)]
pub struct IssueCreditCommand {
    pub transaction: Transaction,
}

/// Result of an issuance attempt.
#[derive(Debug)]
pub struct IssueCreditResult {
    /// The freshly issued credit. `None` when the transaction had already
    /// been redeemed.
    pub credit: Option<Credit>,
    pub already_issued: bool,
}

/// Handler issuing credits for completed transactions.
pub struct IssueCreditHandler {
    ledger: Arc<dyn CreditLedger>,
}

impl IssueCreditHandler {
    pub fn new(ledger: Arc<dyn CreditLedger>) -> Self {
        Self { ledger }
    }

    /// Issues a credit for the command's transaction.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the transaction is not completed
    /// - `Infrastructure` if the ledger write fails
    pub async fn handle(&self, cmd: IssueCreditCommand) -> Result<IssueCreditResult, LedgerError> {
        let tx = &cmd.transaction;
        if !tx.is_completed() {
            return Err(LedgerError::invalid_state(
                format!("{:?}", tx.status).to_lowercase(),
                "issue",
            ));
        }

        match self
            .ledger
            .issue(tx.user_id, &tx.product_code, tx.id)
            .await
        {
            Ok(credit) => {
                tracing::info!(
                    credit_id = %credit.id,
                    user_id = %tx.user_id,
                    transaction_id = %tx.id,
                    "credit issued"
                );
                Ok(IssueCreditResult {
                    credit: Some(credit),
                    already_issued: false,
                })
            }
            Err(LedgerError::DuplicateIssuance { .. }) => {
                tracing::info!(
                    transaction_id = %tx.id,
                    "transaction already redeemed, skipping issuance"
                );
                Ok(IssueCreditResult {
                    credit: None,
                    already_issued: true,
                })
            }
            Err(other) => Err(other),
        }
    }
}
