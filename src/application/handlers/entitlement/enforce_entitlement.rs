//! EnforceEntitlementHandler - Entitlement evaluation for save attempts.
//!
//! Gathers the decision snapshot (upgrade product, ledger availability,
//! consumed-for-resource binding, club plan) through ports and applies the
//! pure policy. Performs no writes, so it is safe to call repeatedly and
//! under arbitrary concurrency; actual credit consumption belongs to the
//! orchestrator.

use std::sync::Arc;

use crate::domain::catalog::ProductCode;
use crate::domain::entitlement::{
    decide_club_creation, decide_club_event, decide_csv_export, decide_member_add,
    decide_personal_event, ClubEventContext, EntitlementDecision, EntitlementError,
    PersonalEventContext,
};
use crate::domain::foundation::{ClubId, ResourceId, UserId};
use crate::ports::{ClubService, CreditLedger, ProductCatalog};

/// Platform-level policy settings carried in from configuration.
#[derive(Debug, Clone)]
pub struct PolicySettings {
    /// Participants allowed without any payment.
    pub free_event_participants: u32,
    /// Product whose constraint defines the one-off limit and whose price
    /// is quoted in rejections.
    pub event_upgrade_product_code: ProductCode,
}

/// Command to evaluate entitlement for an event save.
#[derive(Debug, Clone)]
pub struct EnforceEntitlementCommand {
    pub user_id: UserId,
    pub club_id: Option<ClubId>,
    pub requested_participants: u32,
    pub is_paid: bool,
    /// Caller has already confirmed the credit spend (`confirm_credit=1`).
    pub confirm_credit: bool,
    /// Target resource, when re-evaluating an existing one.
    pub resource_id: Option<ResourceId>,
}

/// Handler evaluating entitlement for monetized actions.
pub struct EnforceEntitlementHandler {
    catalog: Arc<dyn ProductCatalog>,
    ledger: Arc<dyn CreditLedger>,
    clubs: Arc<dyn ClubService>,
    settings: PolicySettings,
}

impl EnforceEntitlementHandler {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        ledger: Arc<dyn CreditLedger>,
        clubs: Arc<dyn ClubService>,
        settings: PolicySettings,
    ) -> Self {
        Self {
            catalog,
            ledger,
            clubs,
            settings,
        }
    }

    /// Evaluate an event save attempt.
    ///
    /// # Errors
    ///
    /// - `ConfirmationRequired` when a credit spend awaits confirmation
    /// - `PaymentRequired` when the save is rejected with remediation options
    /// - `Infrastructure` when a collaborator read fails
    pub async fn handle(
        &self,
        cmd: EnforceEntitlementCommand,
    ) -> Result<EntitlementDecision, EntitlementError> {
        if let Some(club_id) = cmd.club_id {
            return self.evaluate_club_event(&cmd, club_id).await;
        }
        self.evaluate_personal_event(&cmd).await
    }

    /// Supplementary gate: adding a member to a club.
    pub async fn check_member_add(
        &self,
        club_id: ClubId,
    ) -> Result<EntitlementDecision, EntitlementError> {
        let plan = self.club_plan(club_id).await?;
        let current_members = self
            .clubs
            .get_member_count(club_id)
            .await
            .map_err(|e| EntitlementError::infrastructure(e.to_string()))?;
        decide_member_add(&plan, current_members)
    }

    /// Supplementary gate: exporting a club's attendee list as CSV.
    pub async fn check_csv_export(
        &self,
        club_id: ClubId,
    ) -> Result<EntitlementDecision, EntitlementError> {
        let plan = self.club_plan(club_id).await?;
        decide_csv_export(&plan)
    }

    /// Supplementary gate: creating a club.
    pub async fn check_club_creation(
        &self,
        user_id: UserId,
    ) -> Result<EntitlementDecision, EntitlementError> {
        let has_plan = self
            .clubs
            .user_has_club_plan(user_id)
            .await
            .map_err(|e| EntitlementError::infrastructure(e.to_string()))?;
        decide_club_creation(has_plan)
    }

    async fn evaluate_personal_event(
        &self,
        cmd: &EnforceEntitlementCommand,
    ) -> Result<EntitlementDecision, EntitlementError> {
        let upgrade = self
            .catalog
            .get_product(&self.settings.event_upgrade_product_code)
            .await
            .map_err(|e| EntitlementError::infrastructure(e.to_string()))?
            .ok_or_else(|| {
                EntitlementError::infrastructure(format!(
                    "upgrade product {} is not configured in the catalog",
                    self.settings.event_upgrade_product_code
                ))
            })?;

        let credit_already_consumed = match cmd.resource_id {
            Some(resource_id) => self
                .ledger
                .find_consumed_for_resource(resource_id)
                .await
                .map_err(|e| EntitlementError::infrastructure(e.to_string()))?
                .is_some(),
            None => false,
        };

        let has_available_credit = self
            .ledger
            .has_available(cmd.user_id, &upgrade.code)
            .await
            .map_err(|e| EntitlementError::infrastructure(e.to_string()))?;

        let decision = decide_personal_event(&PersonalEventContext {
            requested_participants: cmd.requested_participants,
            is_paid: cmd.is_paid,
            confirm_credit: cmd.confirm_credit,
            free_limit: self.settings.free_event_participants,
            upgrade,
            has_available_credit,
            credit_already_consumed,
            resource_id: cmd.resource_id,
        });

        if let Ok(outcome) = &decision {
            tracing::debug!(
                user_id = %cmd.user_id,
                participants = cmd.requested_participants,
                requires_credit = outcome.requires_credit,
                "entitlement granted"
            );
        }
        decision
    }

    async fn evaluate_club_event(
        &self,
        cmd: &EnforceEntitlementCommand,
        club_id: ClubId,
    ) -> Result<EntitlementDecision, EntitlementError> {
        let plan = self.club_plan(club_id).await?;
        decide_club_event(&ClubEventContext {
            requested_participants: cmd.requested_participants,
            is_paid: cmd.is_paid,
            plan,
        })
    }

    async fn club_plan(
        &self,
        club_id: ClubId,
    ) -> Result<crate::domain::entitlement::ClubPlan, EntitlementError> {
        self.clubs
            .get_club_plan(club_id)
            .await
            .map_err(|e| EntitlementError::infrastructure(e.to_string()))?
            .ok_or_else(|| {
                EntitlementError::infrastructure(format!("club {} has no plan record", club_id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{Credit, LedgerError, PaymentOption};
    use crate::domain::catalog::{CurrencyCode, Price, Product, ProductConstraints};
    use crate::domain::entitlement::{ClubPlan, PaywallReason, SubscriptionStatus};
    use crate::domain::foundation::{CreditId, DomainError, TransactionId};
    use async_trait::async_trait;
    use std::collections::HashMap;

    // ════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════

    struct MockCatalog {
        products: Vec<Product>,
    }

    #[async_trait]
    impl ProductCatalog for MockCatalog {
        async fn get_product(&self, code: &ProductCode) -> Result<Option<Product>, DomainError> {
            Ok(self.products.iter().find(|p| &p.code == code).cloned())
        }
    }

    struct MockLedger {
        available: bool,
        consumed_for: Option<ResourceId>,
        fail_reads: bool,
    }

    impl MockLedger {
        fn empty() -> Self {
            Self {
                available: false,
                consumed_for: None,
                fail_reads: false,
            }
        }

        fn with_available() -> Self {
            Self {
                available: true,
                consumed_for: None,
                fail_reads: false,
            }
        }
    }

    #[async_trait]
    impl CreditLedger for MockLedger {
        async fn issue(
            &self,
            _user_id: UserId,
            _credit_code: &ProductCode,
            _source_transaction_id: TransactionId,
        ) -> Result<Credit, LedgerError> {
            unreachable!("policy evaluation never issues")
        }

        async fn has_available(
            &self,
            _user_id: UserId,
            _credit_code: &ProductCode,
        ) -> Result<bool, LedgerError> {
            if self.fail_reads {
                return Err(LedgerError::infrastructure("simulated read failure"));
            }
            Ok(self.available)
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
            _user_id: UserId,
            _credit_code: &ProductCode,
            _resource_id: ResourceId,
        ) -> Result<Credit, LedgerError> {
            unreachable!("policy evaluation never consumes")
        }

        async fn find_consumed_for_resource(
            &self,
            resource_id: ResourceId,
        ) -> Result<Option<Credit>, LedgerError> {
            if self.fail_reads {
                return Err(LedgerError::infrastructure("simulated read failure"));
            }
            Ok(self.consumed_for.filter(|r| *r == resource_id).map(|r| {
                let mut credit = Credit::issue(
                    CreditId::new(),
                    UserId::new(),
                    ProductCode::new("EVENT_UPGRADE_500").unwrap(),
                    TransactionId::new(),
                );
                credit.consume(r).unwrap();
                credit
            }))
        }
    }

    struct MockClubs {
        plans: HashMap<ClubId, ClubPlan>,
        member_count: u32,
        user_has_plan: bool,
    }

    impl MockClubs {
        fn none() -> Self {
            Self {
                plans: HashMap::new(),
                member_count: 0,
                user_has_plan: false,
            }
        }

        fn with_plan(club_id: ClubId, plan: ClubPlan) -> Self {
            let mut plans = HashMap::new();
            plans.insert(club_id, plan);
            Self {
                plans,
                member_count: 0,
                user_has_plan: true,
            }
        }
    }

    #[async_trait]
    impl ClubService for MockClubs {
        async fn get_club_plan(&self, club_id: ClubId) -> Result<Option<ClubPlan>, DomainError> {
            Ok(self.plans.get(&club_id).cloned())
        }

        async fn get_member_count(&self, _club_id: ClubId) -> Result<u32, DomainError> {
            Ok(self.member_count)
        }

        async fn user_has_club_plan(&self, _user_id: UserId) -> Result<bool, DomainError> {
            Ok(self.user_has_plan)
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════

    fn upgrade_product() -> Product {
        Product {
            code: ProductCode::new("EVENT_UPGRADE_500").unwrap(),
            price: Price::new(49_00, CurrencyCode::Eur),
            constraints: ProductConstraints {
                max_participants: Some(500),
                max_club_members: None,
            },
        }
    }

    fn settings() -> PolicySettings {
        PolicySettings {
            free_event_participants: 50,
            event_upgrade_product_code: ProductCode::new("EVENT_UPGRADE_500").unwrap(),
        }
    }

    fn handler(ledger: MockLedger, clubs: MockClubs) -> EnforceEntitlementHandler {
        EnforceEntitlementHandler::new(
            Arc::new(MockCatalog {
                products: vec![upgrade_product()],
            }),
            Arc::new(ledger),
            Arc::new(clubs),
            settings(),
        )
    }

    fn command(participants: u32) -> EnforceEntitlementCommand {
        EnforceEntitlementCommand {
            user_id: UserId::new(),
            club_id: None,
            requested_participants: participants,
            is_paid: false,
            confirm_credit: false,
            resource_id: None,
        }
    }

    fn active_plan() -> ClubPlan {
        ClubPlan {
            plan_id: "CLUB_BASIC".to_string(),
            subscription: SubscriptionStatus::Active,
            max_event_participants: Some(200),
            max_members: Some(2),
            allow_paid_events: false,
            allow_csv_export: false,
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Personal event evaluation
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn small_event_is_allowed_without_touching_credits() {
        let handler = handler(MockLedger::empty(), MockClubs::none());
        let decision = handler.handle(command(30)).await.unwrap();
        assert!(!decision.requires_credit);
    }

    #[tokio::test]
    async fn upgrade_range_without_credit_rejects_with_catalog_price() {
        let handler = handler(MockLedger::empty(), MockClubs::none());
        let err = handler.handle(command(100)).await.unwrap_err();

        match err {
            EntitlementError::PaymentRequired {
                reason, options, ..
            } => {
                assert_eq!(reason, PaywallReason::PublishRequiresPayment);
                assert!(matches!(
                    options[0],
                    PaymentOption::OneOffCredit { price: 4900, .. }
                ));
            }
            other => panic!("expected payment required, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unconfirmed_credit_spend_asks_for_confirmation() {
        let handler = handler(MockLedger::with_available(), MockClubs::none());
        let err = handler.handle(command(100)).await.unwrap_err();
        assert!(matches!(err, EntitlementError::ConfirmationRequired { .. }));
    }

    #[tokio::test]
    async fn confirmed_credit_spend_is_allowed_with_requires_credit() {
        let handler = handler(MockLedger::with_available(), MockClubs::none());
        let mut cmd = command(100);
        cmd.confirm_credit = true;

        let decision = handler.handle(cmd).await.unwrap();
        assert!(decision.requires_credit);
    }

    #[tokio::test]
    async fn resave_of_paid_resource_needs_no_second_credit() {
        let resource_id = ResourceId::new();
        let ledger = MockLedger {
            available: true,
            consumed_for: Some(resource_id),
            fail_reads: false,
        };
        let handler = handler(ledger, MockClubs::none());
        let mut cmd = command(100);
        cmd.resource_id = Some(resource_id);

        let decision = handler.handle(cmd).await.unwrap();
        assert!(!decision.requires_credit);
    }

    #[tokio::test]
    async fn missing_upgrade_product_is_an_infrastructure_error() {
        let handler = EnforceEntitlementHandler::new(
            Arc::new(MockCatalog { products: vec![] }),
            Arc::new(MockLedger::empty()),
            Arc::new(MockClubs::none()),
            settings(),
        );
        let err = handler.handle(command(100)).await.unwrap_err();
        assert!(matches!(err, EntitlementError::Infrastructure(_)));
    }

    #[tokio::test]
    async fn ledger_read_failure_propagates_as_infrastructure() {
        let ledger = MockLedger {
            available: false,
            consumed_for: None,
            fail_reads: true,
        };
        let handler = handler(ledger, MockClubs::none());
        let err = handler.handle(command(100)).await.unwrap_err();
        assert!(matches!(err, EntitlementError::Infrastructure(_)));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Club-scoped evaluation
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn club_event_is_gated_by_plan_not_credits() {
        let club_id = ClubId::new();
        // Ledger mock panics on consume/issue; a club save must not go near it.
        let handler = handler(
            MockLedger::with_available(),
            MockClubs::with_plan(club_id, active_plan()),
        );
        let mut cmd = command(300);
        cmd.club_id = Some(club_id);

        let err = handler.handle(cmd).await.unwrap_err();
        assert_eq!(
            err.paywall_reason(),
            Some(PaywallReason::MaxEventParticipantsExceeded)
        );
    }

    #[tokio::test]
    async fn member_add_gate_uses_live_member_count() {
        let club_id = ClubId::new();
        let mut clubs = MockClubs::with_plan(club_id, active_plan());
        clubs.member_count = 2; // at the plan cap of 2
        let handler = handler(MockLedger::empty(), clubs);

        let err = handler.check_member_add(club_id).await.unwrap_err();
        assert_eq!(
            err.paywall_reason(),
            Some(PaywallReason::MaxClubMembersExceeded)
        );
    }

    #[tokio::test]
    async fn csv_export_gate_reads_plan_feature() {
        let club_id = ClubId::new();
        let handler = handler(
            MockLedger::empty(),
            MockClubs::with_plan(club_id, active_plan()),
        );
        let err = handler.check_csv_export(club_id).await.unwrap_err();
        assert_eq!(err.paywall_reason(), Some(PaywallReason::CsvExportNotAllowed));
    }

    #[tokio::test]
    async fn club_creation_gate_requires_a_plan() {
        let handler = handler(MockLedger::empty(), MockClubs::none());
        let err = handler.check_club_creation(UserId::new()).await.unwrap_err();
        assert_eq!(
            err.paywall_reason(),
            Some(PaywallReason::ClubCreationRequiresPlan)
        );
    }

    #[tokio::test]
    async fn unknown_club_is_an_infrastructure_error() {
        let handler = handler(MockLedger::empty(), MockClubs::none());
        let mut cmd = command(10);
        cmd.club_id = Some(ClubId::new());

        let err = handler.handle(cmd).await.unwrap_err();
        assert!(matches!(err, EntitlementError::Infrastructure(_)));
    }

    #[tokio::test]
    async fn infrastructure_faults_never_surface_as_paywalls() {
        let err = EntitlementError::infrastructure("boom");
        assert_eq!(err.paywall_reason(), None);
    }
}
