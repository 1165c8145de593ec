//! In-memory credit ledger for tests and local development.
//!
//! All mutation happens under a single lock, so the claim in `consume` is
//! atomic the same way the SQL adapter's conditional UPDATE is: concurrent
//! consumers serialize on the lock and at most one of them finds the credit
//! still available.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::billing::{Credit, LedgerError};
use crate::domain::catalog::ProductCode;
use crate::domain::foundation::{CreditId, ResourceId, TransactionId, UserId};
use crate::ports::CreditLedger;

#[derive(Default)]
pub struct InMemoryCreditLedger {
    credits: Mutex<Vec<Credit>>,
}

impl InMemoryCreditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every credit, any status. Test helper.
    pub fn all(&self) -> Vec<Credit> {
        self.credits.lock().expect("ledger lock poisoned").clone()
    }
}

#[async_trait]
impl CreditLedger for InMemoryCreditLedger {
    async fn issue(
        &self,
        user_id: UserId,
        credit_code: &ProductCode,
        source_transaction_id: TransactionId,
    ) -> Result<Credit, LedgerError> {
        let mut credits = self.credits.lock().expect("ledger lock poisoned");
        if credits
            .iter()
            .any(|c| c.source_transaction_id == source_transaction_id)
        {
            return Err(LedgerError::duplicate_issuance(source_transaction_id));
        }

        let credit = Credit::issue(
            CreditId::new(),
            user_id,
            credit_code.clone(),
            source_transaction_id,
        );
        credits.push(credit.clone());
        Ok(credit)
    }

    async fn has_available(
        &self,
        user_id: UserId,
        credit_code: &ProductCode,
    ) -> Result<bool, LedgerError> {
        let credits = self.credits.lock().expect("ledger lock poisoned");
        Ok(credits
            .iter()
            .any(|c| c.user_id == user_id && &c.credit_code == credit_code && c.is_available()))
    }

    async fn list_available(
        &self,
        user_id: UserId,
        credit_code: &ProductCode,
    ) -> Result<Vec<Credit>, LedgerError> {
        let credits = self.credits.lock().expect("ledger lock poisoned");
        let mut available: Vec<Credit> = credits
            .iter()
            .filter(|c| c.user_id == user_id && &c.credit_code == credit_code && c.is_available())
            .cloned()
            .collect();
        available.sort_by_key(|c| *c.issued_at.as_datetime());
        Ok(available)
    }

    async fn consume(
        &self,
        user_id: UserId,
        credit_code: &ProductCode,
        resource_id: ResourceId,
    ) -> Result<Credit, LedgerError> {
        if resource_id.is_nil() {
            return Err(LedgerError::MissingConsumedResource);
        }

        let mut credits = self.credits.lock().expect("ledger lock poisoned");
        let candidate = credits
            .iter_mut()
            .filter(|c| c.user_id == user_id && &c.credit_code == credit_code && c.is_available())
            .min_by_key(|c| *c.issued_at.as_datetime());

        match candidate {
            Some(credit) => {
                credit.consume(resource_id)?;
                Ok(credit.clone())
            }
            None => Err(LedgerError::no_credit_available(credit_code.clone())),
        }
    }

    async fn find_consumed_for_resource(
        &self,
        resource_id: ResourceId,
    ) -> Result<Option<Credit>, LedgerError> {
        let credits = self.credits.lock().expect("ledger lock poisoned");
        Ok(credits
            .iter()
            .find(|c| c.consumed_resource_id == Some(resource_id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::CreditStatus;

    fn code() -> ProductCode {
        ProductCode::new("EVENT_UPGRADE_500").unwrap()
    }

    #[tokio::test]
    async fn issue_then_consume_binds_resource() {
        let ledger = InMemoryCreditLedger::new();
        let user_id = UserId::new();
        let resource_id = ResourceId::new();

        ledger
            .issue(user_id, &code(), TransactionId::new())
            .await
            .unwrap();
        let credit = ledger.consume(user_id, &code(), resource_id).await.unwrap();

        assert_eq!(credit.status, CreditStatus::Consumed);
        assert_eq!(credit.consumed_resource_id, Some(resource_id));
        assert!(!ledger.has_available(user_id, &code()).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_issuance_is_rejected() {
        let ledger = InMemoryCreditLedger::new();
        let tx = TransactionId::new();

        ledger.issue(UserId::new(), &code(), tx).await.unwrap();
        let err = ledger.issue(UserId::new(), &code(), tx).await.unwrap_err();

        assert!(matches!(err, LedgerError::DuplicateIssuance { .. }));
        assert_eq!(ledger.all().len(), 1);
    }

    #[tokio::test]
    async fn consume_with_nothing_available_reports_no_credit() {
        let ledger = InMemoryCreditLedger::new();

        let err = ledger
            .consume(UserId::new(), &code(), ResourceId::new())
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::NoCreditAvailable { .. }));
    }

    #[tokio::test]
    async fn consume_guards_nil_resource_before_claiming() {
        let ledger = InMemoryCreditLedger::new();
        let user_id = UserId::new();
        ledger
            .issue(user_id, &code(), TransactionId::new())
            .await
            .unwrap();

        let err = ledger
            .consume(user_id, &code(), ResourceId::nil())
            .await
            .unwrap_err();

        assert_eq!(err, LedgerError::MissingConsumedResource);
        // The credit is untouched.
        assert!(ledger.has_available(user_id, &code()).await.unwrap());
    }

    #[tokio::test]
    async fn consume_claims_the_oldest_credit_first() {
        let ledger = InMemoryCreditLedger::new();
        let user_id = UserId::new();
        let first = ledger
            .issue(user_id, &code(), TransactionId::new())
            .await
            .unwrap();
        let _second = ledger
            .issue(user_id, &code(), TransactionId::new())
            .await
            .unwrap();

        let consumed = ledger
            .consume(user_id, &code(), ResourceId::new())
            .await
            .unwrap();

        assert_eq!(consumed.id, first.id);
    }

    #[tokio::test]
    async fn credits_are_scoped_to_user_and_code() {
        let ledger = InMemoryCreditLedger::new();
        let owner = UserId::new();
        ledger
            .issue(owner, &code(), TransactionId::new())
            .await
            .unwrap();

        let err = ledger
            .consume(UserId::new(), &code(), ResourceId::new())
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::NoCreditAvailable { .. }));
        assert!(ledger.has_available(owner, &code()).await.unwrap());
    }
}
