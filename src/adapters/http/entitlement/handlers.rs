//! HTTP handlers for entitlement and billing endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::billing::{ListAvailableCreditsHandler, ListAvailableCreditsQuery};
use crate::application::handlers::entitlement::{
    CreditTransactionOrchestrator, EnforceEntitlementCommand, EnforceEntitlementHandler,
    PolicySettings,
};
use crate::domain::billing::{LedgerError, PaymentOption};
use crate::domain::catalog::ProductCode;
use crate::domain::entitlement::{EntitlementError, PaywallReason};
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{ClubService, CreditLedger, NewResource, ProductCatalog, ResourceService};

use super::dto::{
    ConfirmationRequiredResponse, CreditResponse, ErrorResponse, ListCreditsResponse,
    PaywallResponse, ProductResponse, SaveEventQuery, SaveEventRequest, SaveEventResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct BillingAppState {
    pub catalog: Arc<dyn ProductCatalog>,
    pub ledger: Arc<dyn CreditLedger>,
    pub resources: Arc<dyn ResourceService>,
    pub clubs: Arc<dyn ClubService>,
    pub settings: PolicySettings,
}

impl BillingAppState {
    /// Create handlers on demand from the shared state.
    pub fn enforce_handler(&self) -> EnforceEntitlementHandler {
        EnforceEntitlementHandler::new(
            self.catalog.clone(),
            self.ledger.clone(),
            self.clubs.clone(),
            self.settings.clone(),
        )
    }

    pub fn orchestrator(&self) -> CreditTransactionOrchestrator {
        CreditTransactionOrchestrator::new(
            self.ledger.clone(),
            self.resources.clone(),
            self.catalog.clone(),
        )
    }

    pub fn list_credits_handler(&self) -> ListAvailableCreditsHandler {
        ListAvailableCreditsHandler::new(self.ledger.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from request.
///
/// In production, this would be extracted from JWT/session by auth middleware.
/// For now, uses a header-based extraction for development/testing.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            // In production, this would validate a session token.
            // For development, we accept an X-User-Id header.
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<UserId>().ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/events - Save an event, enforcing entitlement first.
///
/// Honors the `confirm_credit=1` query parameter on confirmed retries. An
/// optional `Idempotency-Key` header is recorded for correlation; storage
/// level guarantees (atomic claim, consumed-for-resource re-save check) make
/// retried submissions safe without a dedicated key store.
pub async fn save_event(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
    Query(params): Query<SaveEventQuery>,
    headers: HeaderMap,
    Json(request): Json<SaveEventRequest>,
) -> Result<impl IntoResponse, EntitlementApiError> {
    if let Some(key) = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
    {
        tracing::info!(idempotency_key = %key, "save request carries correlation id");
    }

    let decision = state
        .enforce_handler()
        .handle(EnforceEntitlementCommand {
            user_id: user.user_id,
            club_id: request.club_id,
            requested_participants: request.participants,
            is_paid: request.is_paid,
            confirm_credit: params.confirm_credit != 0,
            resource_id: request.resource_id,
        })
        .await?;

    let participants = request.participants;
    let is_paid = request.is_paid;
    let club_id = request.club_id;
    let new_resource = NewResource {
        owner_id: user.user_id,
        title: request.title,
        participants,
        club_id,
        is_paid,
    };

    let (event_id, consumed_credit_id) = if decision.requires_credit {
        let resources = state.resources.clone();
        let outcome = state
            .orchestrator()
            .with_credit_transaction(
                user.user_id,
                &state.settings.event_upgrade_product_code,
                move || async move {
                    resources
                        .create_resource(new_resource)
                        .await
                        .map_err(|e| EntitlementError::infrastructure(e.to_string()))
                },
            )
            .await?;
        (outcome.created, Some(outcome.consumed_credit.id.to_string()))
    } else {
        let id = state.resources.create_resource(new_resource).await?;
        (id, None)
    };

    let response = SaveEventResponse {
        event_id: event_id.to_string(),
        participants,
        is_paid,
        club_id: club_id.map(|id| id.to_string()),
        credit_consumed: consumed_credit_id.is_some(),
        consumed_credit_id,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/credits - List the current user's available event upgrade credits.
pub async fn list_credits(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, EntitlementApiError> {
    let handler = state.list_credits_handler();
    let credits = handler
        .handle(ListAvailableCreditsQuery {
            user_id: user.user_id,
            credit_code: state.settings.event_upgrade_product_code.clone(),
        })
        .await?;

    let response = ListCreditsResponse {
        credits: credits.into_iter().map(CreditResponse::from).collect(),
    };

    Ok(Json(response))
}

/// GET /api/products/{code} - Look up a catalog product.
pub async fn get_product(
    State(state): State<BillingAppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, EntitlementApiError> {
    let code = ProductCode::new(code)
        .map_err(|e| EntitlementApiError::BadRequest(e.to_string()))?;

    match state.catalog.get_product(&code).await? {
        Some(product) => Ok(Json(ProductResponse::from(product))),
        None => Err(EntitlementApiError::NotFound(format!(
            "product {} not found",
            code
        ))),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
pub enum EntitlementApiError {
    Entitlement(EntitlementError),
    Ledger(LedgerError),
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<EntitlementError> for EntitlementApiError {
    fn from(err: EntitlementError) -> Self {
        Self::Entitlement(err)
    }
}

impl From<LedgerError> for EntitlementApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<DomainError> for EntitlementApiError {
    fn from(err: DomainError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for EntitlementApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            EntitlementApiError::Entitlement(EntitlementError::ConfirmationRequired {
                credit_code,
                resource_id,
                requested_participants,
            }) => {
                let body = ConfirmationRequiredResponse::new(
                    credit_code.as_str().to_string(),
                    resource_id,
                    requested_participants,
                );
                (StatusCode::CONFLICT, Json(body)).into_response()
            }
            EntitlementApiError::Entitlement(EntitlementError::PaymentRequired {
                reason,
                options,
                current_plan_id,
                required_plan_id,
            }) => {
                let body = PaywallResponse::new(reason, options, current_plan_id, required_plan_id);
                (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response()
            }
            EntitlementApiError::Entitlement(EntitlementError::Infrastructure(msg)) => {
                tracing::error!(error = %msg, "entitlement infrastructure failure");
                internal_error()
            }
            EntitlementApiError::Ledger(LedgerError::NoCreditAvailable { .. }) => {
                let body = PaywallResponse::new(
                    PaywallReason::NoCreditAvailable,
                    vec![PaymentOption::ClubAccess],
                    None,
                    None,
                );
                (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response()
            }
            EntitlementApiError::Ledger(err @ LedgerError::DuplicateIssuance { .. }) => {
                let body = ErrorResponse::new("ALREADY_ISSUED", err.message());
                (StatusCode::CONFLICT, Json(body)).into_response()
            }
            EntitlementApiError::Ledger(err) => {
                tracing::error!(error = %err, "ledger failure");
                internal_error()
            }
            EntitlementApiError::BadRequest(msg) => {
                let body = ErrorResponse::new("VALIDATION_FAILED", msg);
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            EntitlementApiError::NotFound(msg) => {
                let body = ErrorResponse::new("NOT_FOUND", msg);
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            EntitlementApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal failure");
                internal_error()
            }
        }
    }
}

fn internal_error() -> axum::response::Response {
    let body = ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
