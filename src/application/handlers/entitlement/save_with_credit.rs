//! CreditTransactionOrchestrator - create-then-consume with compensation.
//!
//! A credit-consuming save spans two non-transactional steps: persist the
//! resource, then atomically claim a credit against it. When the claim fails
//! the orchestrator compensates by deleting the just-created resource, so a
//! user never ends up with a large event they did not pay for. Compensation
//! is best-effort: if the delete itself fails, the failure is logged loudly
//! and the original error is still the one returned.

use std::future::Future;
use std::sync::Arc;

use crate::domain::billing::{Credit, LedgerError, PaymentOption};
use crate::domain::catalog::ProductCode;
use crate::domain::entitlement::{EntitlementError, PaywallReason};
use crate::domain::foundation::{ResourceId, UserId};
use crate::ports::{CreditLedger, ProductCatalog, ResourceService};

/// Anything the orchestrator creates must expose the persisted id the credit
/// is bound to (and that compensation deletes).
pub trait CreatedResource {
    fn resource_id(&self) -> ResourceId;
}

impl CreatedResource for ResourceId {
    fn resource_id(&self) -> ResourceId {
        *self
    }
}

/// Outcome of a credit-consuming save.
#[derive(Debug)]
pub struct CreditSaveOutcome<T> {
    /// Whatever the create step produced, kept intact.
    pub created: T,
    /// The credit that was claimed, with its resource binding applied.
    pub consumed_credit: Credit,
}

/// Orchestrates resource creation paired with exactly-once credit consumption.
pub struct CreditTransactionOrchestrator {
    ledger: Arc<dyn CreditLedger>,
    resources: Arc<dyn ResourceService>,
    catalog: Arc<dyn ProductCatalog>,
}

impl CreditTransactionOrchestrator {
    pub fn new(
        ledger: Arc<dyn CreditLedger>,
        resources: Arc<dyn ResourceService>,
        catalog: Arc<dyn ProductCatalog>,
    ) -> Self {
        Self {
            ledger,
            resources,
            catalog,
        }
    }

    /// Runs `create`, then claims one available credit for `user_id` bound to
    /// the created resource. On any consumption failure the created resource
    /// is deleted before the error is returned.
    ///
    /// Exhaustion of the ledger (e.g. a concurrent save claimed the last
    /// credit between evaluation and consumption) is reported as a
    /// `PaymentRequired` rejection with freshly priced options, so callers
    /// see the same remediation payload as an unevaluated save would.
    ///
    /// # Errors
    ///
    /// - `PaymentRequired` when no credit was left to claim
    /// - `Infrastructure` for storage faults or precondition violations
    pub async fn with_credit_transaction<T, F, Fut>(
        &self,
        user_id: UserId,
        credit_code: &ProductCode,
        create: F,
    ) -> Result<CreditSaveOutcome<T>, EntitlementError>
    where
        T: CreatedResource,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, EntitlementError>> + Send,
    {
        // Resolve the product up front so a rejection can be priced even
        // after the ledger claim has failed.
        let product = self
            .catalog
            .get_product(credit_code)
            .await
            .map_err(|e| EntitlementError::infrastructure(e.to_string()))?
            .ok_or_else(|| {
                EntitlementError::infrastructure(format!(
                    "credit product {} is not configured in the catalog",
                    credit_code
                ))
            })?;

        let created = create().await?;
        let resource_id = created.resource_id();

        match self.ledger.consume(user_id, credit_code, resource_id).await {
            Ok(consumed_credit) => {
                tracing::info!(
                    user_id = %user_id,
                    resource_id = %resource_id,
                    credit_id = %consumed_credit.id,
                    "credit consumed for resource"
                );
                Ok(CreditSaveOutcome {
                    created,
                    consumed_credit,
                })
            }
            Err(claim_err) => {
                self.compensate(resource_id, &claim_err).await;
                Err(match claim_err {
                    LedgerError::NoCreditAvailable { .. } => EntitlementError::payment_required(
                        PaywallReason::NoCreditAvailable,
                        vec![
                            PaymentOption::one_off_credit(&product),
                            PaymentOption::ClubAccess,
                        ],
                    ),
                    other => EntitlementError::infrastructure(other.to_string()),
                })
            }
        }
    }

    /// Deletes the resource the failed claim was bound to. A compensation
    /// failure leaves an orphaned unpaid resource behind; it is logged for
    /// operator cleanup and must not mask the claim error.
    async fn compensate(&self, resource_id: ResourceId, claim_err: &LedgerError) {
        tracing::warn!(
            resource_id = %resource_id,
            error = %claim_err,
            "credit claim failed, rolling back resource creation"
        );
        if let Err(delete_err) = self.resources.delete_resource(resource_id).await {
            tracing::error!(
                resource_id = %resource_id,
                claim_error = %claim_err,
                delete_error = %delete_err,
                "compensation failed: unpaid resource left behind"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::CreditStatus;
    use crate::domain::catalog::{CurrencyCode, Price, Product, ProductConstraints};
    use crate::domain::foundation::{CreditId, DomainError, ErrorCode, TransactionId};
    use crate::ports::{NewResource, ResourceSummary};
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════

    struct MockCatalog;

    #[async_trait]
    impl ProductCatalog for MockCatalog {
        async fn get_product(&self, code: &ProductCode) -> Result<Option<Product>, DomainError> {
            Ok(Some(Product {
                code: code.clone(),
                price: Price::new(49_00, CurrencyCode::Eur),
                constraints: ProductConstraints {
                    max_participants: Some(500),
                    max_club_members: None,
                },
            }))
        }
    }

    /// Ledger mock scripted to succeed or fail the claim.
    struct ScriptedLedger {
        consume_result: Mutex<Option<Result<(), LedgerError>>>,
    }

    impl ScriptedLedger {
        fn succeeding() -> Self {
            Self {
                consume_result: Mutex::new(Some(Ok(()))),
            }
        }

        fn failing(err: LedgerError) -> Self {
            Self {
                consume_result: Mutex::new(Some(Err(err))),
            }
        }
    }

    #[async_trait]
    impl CreditLedger for ScriptedLedger {
        async fn issue(
            &self,
            _user_id: UserId,
            _credit_code: &ProductCode,
            _source_transaction_id: TransactionId,
        ) -> Result<Credit, LedgerError> {
            unreachable!("orchestrator never issues")
        }

        async fn has_available(
            &self,
            _user_id: UserId,
            _credit_code: &ProductCode,
        ) -> Result<bool, LedgerError> {
            Ok(true)
        }

        async fn list_available(
            &self,
            _user_id: UserId,
            _credit_code: &ProductCode,
        ) -> Result<Vec<Credit>, LedgerError> {
            Ok(vec![])
        }

        async fn consume(
            &self,
            user_id: UserId,
            credit_code: &ProductCode,
            resource_id: ResourceId,
        ) -> Result<Credit, LedgerError> {
            let scripted = self
                .consume_result
                .lock()
                .unwrap()
                .take()
                .expect("consume called more than once");
            scripted.map(|_| {
                let mut credit = Credit::issue(
                    CreditId::new(),
                    user_id,
                    credit_code.clone(),
                    TransactionId::new(),
                );
                credit.consume(resource_id).unwrap();
                credit
            })
        }

        async fn find_consumed_for_resource(
            &self,
            _resource_id: ResourceId,
        ) -> Result<Option<Credit>, LedgerError> {
            Ok(None)
        }
    }

    /// Resource service recording deletes, optionally failing them.
    struct RecordingResources {
        deleted: Mutex<Vec<ResourceId>>,
        fail_delete: bool,
    }

    impl RecordingResources {
        fn new() -> Self {
            Self {
                deleted: Mutex::new(vec![]),
                fail_delete: false,
            }
        }

        fn with_failing_delete() -> Self {
            Self {
                deleted: Mutex::new(vec![]),
                fail_delete: true,
            }
        }

        fn deleted_ids(&self) -> Vec<ResourceId> {
            self.deleted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResourceService for RecordingResources {
        async fn create_resource(&self, _resource: NewResource) -> Result<ResourceId, DomainError> {
            Ok(ResourceId::new())
        }

        async fn delete_resource(&self, resource_id: ResourceId) -> Result<(), DomainError> {
            if self.fail_delete {
                return Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    "delete rejected",
                ));
            }
            self.deleted.lock().unwrap().push(resource_id);
            Ok(())
        }

        async fn get_resource(
            &self,
            _resource_id: ResourceId,
        ) -> Result<Option<ResourceSummary>, DomainError> {
            Ok(None)
        }
    }

    fn orchestrator(
        ledger: ScriptedLedger,
        resources: Arc<RecordingResources>,
    ) -> CreditTransactionOrchestrator {
        CreditTransactionOrchestrator::new(Arc::new(ledger), resources, Arc::new(MockCatalog))
    }

    fn credit_code() -> ProductCode {
        ProductCode::new("EVENT_UPGRADE_500").unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Happy path
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn successful_save_returns_resource_and_bound_credit() {
        let resources = Arc::new(RecordingResources::new());
        let orchestrator = orchestrator(ScriptedLedger::succeeding(), resources.clone());
        let resource_id = ResourceId::new();

        let outcome = orchestrator
            .with_credit_transaction(UserId::new(), &credit_code(), || async move {
                Ok(resource_id)
            })
            .await
            .unwrap();

        assert_eq!(outcome.created, resource_id);
        assert_eq!(outcome.consumed_credit.status, CreditStatus::Consumed);
        assert_eq!(
            outcome.consumed_credit.consumed_resource_id,
            Some(resource_id)
        );
        assert!(resources.deleted_ids().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Compensation
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn failed_claim_deletes_the_created_resource() {
        let resources = Arc::new(RecordingResources::new());
        let orchestrator = orchestrator(
            ScriptedLedger::failing(LedgerError::no_credit_available(credit_code())),
            resources.clone(),
        );
        let resource_id = ResourceId::new();

        let err = orchestrator
            .with_credit_transaction(UserId::new(), &credit_code(), || async move {
                Ok(resource_id)
            })
            .await
            .unwrap_err();

        assert_eq!(resources.deleted_ids(), vec![resource_id]);
        match err {
            EntitlementError::PaymentRequired {
                reason, options, ..
            } => {
                assert_eq!(reason, PaywallReason::NoCreditAvailable);
                // The rejection is priced from the catalog like any other.
                assert!(options.iter().any(PaymentOption::is_one_off_credit));
                assert!(options.iter().any(PaymentOption::is_club_access));
            }
            other => panic!("expected payment required, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn compensation_failure_does_not_mask_the_claim_error() {
        let resources = Arc::new(RecordingResources::with_failing_delete());
        let orchestrator = orchestrator(
            ScriptedLedger::failing(LedgerError::no_credit_available(credit_code())),
            resources,
        );

        let err = orchestrator
            .with_credit_transaction(UserId::new(), &credit_code(), || async {
                Ok(ResourceId::new())
            })
            .await
            .unwrap_err();

        // Still the claim failure, not the delete failure.
        assert_eq!(err.paywall_reason(), Some(PaywallReason::NoCreditAvailable));
    }

    #[tokio::test]
    async fn infrastructure_claim_failure_compensates_and_propagates() {
        let resources = Arc::new(RecordingResources::new());
        let orchestrator = orchestrator(
            ScriptedLedger::failing(LedgerError::infrastructure("connection reset")),
            resources.clone(),
        );

        let err = orchestrator
            .with_credit_transaction(UserId::new(), &credit_code(), || async {
                Ok(ResourceId::new())
            })
            .await
            .unwrap_err();

        assert_eq!(resources.deleted_ids().len(), 1);
        assert!(matches!(err, EntitlementError::Infrastructure(_)));
    }

    #[tokio::test]
    async fn create_failure_never_touches_the_ledger() {
        let resources = Arc::new(RecordingResources::new());
        // Scripted to succeed; taking the script would panic on double use,
        // and an untouched script means consume was never called.
        let ledger = ScriptedLedger::succeeding();
        let orchestrator = CreditTransactionOrchestrator::new(
            Arc::new(ledger),
            resources.clone(),
            Arc::new(MockCatalog),
        );

        let err = orchestrator
            .with_credit_transaction(UserId::new(), &credit_code(), || async {
                Err::<ResourceId, _>(EntitlementError::infrastructure("create rejected"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, EntitlementError::Infrastructure(_)));
        assert!(resources.deleted_ids().is_empty());
    }
}
