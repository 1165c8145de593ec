//! Pure entitlement decision functions.
//!
//! Each function decides over a snapshot of current state gathered by the
//! application layer; none of them reads ports or mutates anything, so they
//! are safe to call repeatedly and concurrently. Credits are only ever
//! *mentioned* here - consumption belongs to the orchestrator.
//!
//! Decision ladder for a personal (non-club) event save:
//!
//! 1. `participants <= free_limit` - allowed, credits untouched
//! 2. `participants <= one-off limit` (the upgrade product's participant cap)
//!    - a credit already consumed against this resource: allowed (re-save)
//!    - an available credit + no confirmation: confirmation-required signal
//!    - an available credit + confirmation: allowed, `requires_credit: true`
//!    - no credit: rejected with the priced one-off option and club access
//! 3. above the one-off limit: rejected with club access as the only option -
//!    large events cannot be unlocked by a single credit

use crate::domain::billing::PaymentOption;
use crate::domain::catalog::Product;
use crate::domain::foundation::ResourceId;

use super::{ClubPlan, EntitlementDecision, EntitlementError, PaywallReason, SubscriptionStatus};

/// Snapshot of everything a personal event save decision needs.
#[derive(Debug, Clone)]
pub struct PersonalEventContext {
    /// Participant cap requested for the event being saved.
    pub requested_participants: u32,
    /// Whether the event sells tickets.
    pub is_paid: bool,
    /// Caller has already confirmed the credit spend.
    pub confirm_credit: bool,
    /// Participants allowed without any payment (platform configuration).
    pub free_limit: u32,
    /// The one-off upgrade product, read from the catalog at decision time.
    pub upgrade: Product,
    /// User holds at least one available credit for the upgrade product.
    pub has_available_credit: bool,
    /// A credit was already consumed against the target resource.
    pub credit_already_consumed: bool,
    /// Target resource id, when re-evaluating an existing resource.
    pub resource_id: Option<ResourceId>,
}

/// Decides a personal event save.
///
/// Pure function: performs no reads or writes beyond the given snapshot.
pub fn decide_personal_event(
    ctx: &PersonalEventContext,
) -> Result<EntitlementDecision, EntitlementError> {
    // Paid ticketing needs a club account regardless of size.
    if ctx.is_paid {
        return Err(EntitlementError::payment_required(
            PaywallReason::PaidEventsNotAllowed,
            vec![PaymentOption::ClubAccess],
        ));
    }

    if ctx.requested_participants <= ctx.free_limit {
        return Ok(EntitlementDecision::allowed());
    }

    // An upgrade product without a participant cap unlocks nothing; only the
    // club path remains.
    let within_one_off = ctx
        .upgrade
        .max_participants()
        .map(|limit| ctx.requested_participants <= limit)
        .unwrap_or(false);

    if !within_one_off {
        return Err(EntitlementError::payment_required(
            PaywallReason::ClubRequiredForLargeEvent,
            vec![PaymentOption::ClubAccess],
        ));
    }

    // Idempotent re-save: the resource is already paid for.
    if ctx.credit_already_consumed {
        return Ok(EntitlementDecision::allowed());
    }

    if ctx.has_available_credit {
        if !ctx.confirm_credit {
            return Err(EntitlementError::confirmation_required(
                ctx.upgrade.code.clone(),
                ctx.resource_id,
                ctx.requested_participants,
            ));
        }
        return Ok(EntitlementDecision::with_credit());
    }

    Err(EntitlementError::payment_required(
        PaywallReason::PublishRequiresPayment,
        vec![
            PaymentOption::one_off_credit(&ctx.upgrade),
            PaymentOption::ClubAccess,
        ],
    ))
}

/// Snapshot for a club-scoped event save.
#[derive(Debug, Clone)]
pub struct ClubEventContext {
    pub requested_participants: u32,
    pub is_paid: bool,
    pub plan: ClubPlan,
}

/// Decides a club-scoped event save against the club's plan.
///
/// Club saves are gated by the plan alone and never touch credits.
pub fn decide_club_event(ctx: &ClubEventContext) -> Result<EntitlementDecision, EntitlementError> {
    check_subscription(&ctx.plan)?;

    if ctx.plan.event_participants_exceeded(ctx.requested_participants) {
        return Err(EntitlementError::payment_required(
            PaywallReason::MaxEventParticipantsExceeded,
            vec![PaymentOption::ClubAccess],
        )
        .with_current_plan(ctx.plan.plan_id.clone()));
    }

    if ctx.is_paid && !ctx.plan.allow_paid_events {
        return Err(EntitlementError::payment_required(
            PaywallReason::PaidEventsNotAllowed,
            vec![PaymentOption::ClubAccess],
        )
        .with_current_plan(ctx.plan.plan_id.clone()));
    }

    Ok(EntitlementDecision::allowed())
}

/// Decides whether a club may add one more member.
pub fn decide_member_add(
    plan: &ClubPlan,
    current_members: u32,
) -> Result<EntitlementDecision, EntitlementError> {
    check_subscription(plan)?;

    if plan.member_limit_reached(current_members) {
        return Err(EntitlementError::payment_required(
            PaywallReason::MaxClubMembersExceeded,
            vec![PaymentOption::ClubAccess],
        )
        .with_current_plan(plan.plan_id.clone()));
    }

    Ok(EntitlementDecision::allowed())
}

/// Decides whether a club may export attendee lists as CSV.
pub fn decide_csv_export(plan: &ClubPlan) -> Result<EntitlementDecision, EntitlementError> {
    check_subscription(plan)?;

    if !plan.allow_csv_export {
        return Err(EntitlementError::payment_required(
            PaywallReason::CsvExportNotAllowed,
            vec![PaymentOption::ClubAccess],
        )
        .with_current_plan(plan.plan_id.clone()));
    }

    Ok(EntitlementDecision::allowed())
}

/// Decides whether a user may create a club.
pub fn decide_club_creation(
    has_club_plan: bool,
) -> Result<EntitlementDecision, EntitlementError> {
    if !has_club_plan {
        return Err(EntitlementError::payment_required(
            PaywallReason::ClubCreationRequiresPlan,
            vec![PaymentOption::ClubAccess],
        ));
    }
    Ok(EntitlementDecision::allowed())
}

fn check_subscription(plan: &ClubPlan) -> Result<(), EntitlementError> {
    match plan.subscription {
        SubscriptionStatus::Active => Ok(()),
        SubscriptionStatus::Inactive => Err(EntitlementError::payment_required(
            PaywallReason::SubscriptionNotActive,
            vec![PaymentOption::ClubAccess],
        )
        .with_current_plan(plan.plan_id.clone())),
        SubscriptionStatus::Expired => Err(EntitlementError::payment_required(
            PaywallReason::SubscriptionExpired,
            vec![PaymentOption::ClubAccess],
        )
        .with_current_plan(plan.plan_id.clone())),
    }
}
