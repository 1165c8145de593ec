//! ListAvailableCreditsHandler - read model for a user's spendable credits.

use std::sync::Arc;

use crate::domain::billing::{Credit, LedgerError};
use crate::domain::catalog::ProductCode;
use crate::domain::foundation::UserId;
use crate::ports::CreditLedger;

/// Query for a user's available credits of one type.
#[derive(Debug, Clone)]
pub struct ListAvailableCreditsQuery {
    pub user_id: UserId,
    pub credit_code: ProductCode,
}

pub struct ListAvailableCreditsHandler {
    ledger: Arc<dyn CreditLedger>,
}

impl ListAvailableCreditsHandler {
    pub fn new(ledger: Arc<dyn CreditLedger>) -> Self {
        Self { ledger }
    }

    /// Lists the user's available credits, oldest first.
    pub async fn handle(
        &self,
        query: ListAvailableCreditsQuery,
    ) -> Result<Vec<Credit>, LedgerError> {
        self.ledger
            .list_available(query.user_id, &query.credit_code)
            .await
    }
}
