//! HTTP DTOs for the entitlement and billing endpoints.
//!
//! These types define the JSON request/response structure the platform
//! frontend consumes. The 409 confirmation and 402 paywall envelopes are a
//! published contract: clients match on `error.code` / `error.reason` and
//! render the remediation options, so field names here are camelCase and
//! must not drift.

use serde::{Deserialize, Serialize};

use crate::domain::billing::{Credit, PaymentOption};
use crate::domain::catalog::Product;
use crate::domain::entitlement::{PaywallReason, CONFIRMATION_REASON};
use crate::domain::foundation::{ClubId, ResourceId};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to save (create or update) an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEventRequest {
    pub title: String,
    /// Participant cap requested for the event.
    pub participants: u32,
    /// Whether the event sells tickets.
    #[serde(default)]
    pub is_paid: bool,
    /// Club the event belongs to, if club-scoped.
    #[serde(default)]
    pub club_id: Option<ClubId>,
    /// Existing event id when re-saving.
    #[serde(default)]
    pub resource_id: Option<ResourceId>,
}

/// Query parameters for the save endpoint.
///
/// `confirm_credit=1` is the retry convention: a client that received the
/// 409 confirmation resubmits the same request with this flag set.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveEventQuery {
    #[serde(default)]
    pub confirm_credit: u8,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for a successful event save.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEventResponse {
    pub event_id: String,
    pub participants: u32,
    pub is_paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    /// Whether this save spent a credit.
    pub credit_consumed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_credit_id: Option<String>,
}

/// One credit in the user's wallet listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditResponse {
    pub id: String,
    pub credit_code: String,
    pub issued_at: String,
}

impl From<Credit> for CreditResponse {
    fn from(credit: Credit) -> Self {
        Self {
            id: credit.id.to_string(),
            credit_code: credit.credit_code.as_str().to_string(),
            issued_at: credit.issued_at.to_rfc3339(),
        }
    }
}

/// Response listing a user's available credits.
#[derive(Debug, Clone, Serialize)]
pub struct ListCreditsResponse {
    pub credits: Vec<CreditResponse>,
}

/// Catalog product details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub code: String,
    pub price: i64,
    pub currency_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_club_members: Option<u32>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            code: product.code.as_str().to_string(),
            price: product.price.amount_minor,
            currency_code: product.price.currency_code.as_str().to_string(),
            max_participants: product.constraints.max_participants,
            max_club_members: product.constraints.max_club_members,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Envelopes
// ════════════════════════════════════════════════════════════════════════════════

/// Generic error envelope for plain failures.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// 409 envelope: a credit spend is imminent and needs user confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationRequiredResponse {
    pub error: ConfirmationBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationBody {
    pub code: &'static str,
    pub reason: &'static str,
    pub meta: ConfirmationMeta,
    pub cta: CallToAction,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationMeta {
    pub credit_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub requested_participants: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallToAction {
    pub href: String,
}

impl ConfirmationRequiredResponse {
    pub fn new(
        credit_code: String,
        resource_id: Option<ResourceId>,
        requested_participants: u32,
    ) -> Self {
        Self {
            error: ConfirmationBody {
                code: "CONFIRMATION_REQUIRED",
                reason: CONFIRMATION_REASON,
                meta: ConfirmationMeta {
                    credit_code,
                    resource_id: resource_id.map(|id| id.to_string()),
                    requested_participants,
                },
                cta: CallToAction {
                    href: "/api/events?confirm_credit=1".to_string(),
                },
            },
        }
    }
}

/// 402 envelope: the action is rejected with priced remediation options.
#[derive(Debug, Clone, Serialize)]
pub struct PaywallResponse {
    pub error: PaywallBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaywallBody {
    pub code: &'static str,
    pub reason: PaywallReason,
    pub options: Vec<PaymentOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_plan_id: Option<String>,
}

impl PaywallResponse {
    pub fn new(
        reason: PaywallReason,
        options: Vec<PaymentOption>,
        current_plan_id: Option<String>,
        required_plan_id: Option<String>,
    ) -> Self {
        Self {
            error: PaywallBody {
                code: "PAYWALL",
                reason,
                options,
                current_plan_id,
                required_plan_id,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{CurrencyCode, Price, ProductCode, ProductConstraints};

    #[test]
    fn confirmation_envelope_matches_published_contract() {
        let response = ConfirmationRequiredResponse::new(
            "EVENT_UPGRADE_500".to_string(),
            Some(ResourceId::new()),
            100,
        );
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"]["code"], "CONFIRMATION_REQUIRED");
        assert_eq!(json["error"]["reason"], "EVENT_UPGRADE_WILL_BE_CONSUMED");
        assert_eq!(json["error"]["meta"]["creditCode"], "EVENT_UPGRADE_500");
        assert_eq!(json["error"]["meta"]["requestedParticipants"], 100);
        assert!(json["error"]["cta"]["href"]
            .as_str()
            .unwrap()
            .contains("confirm_credit=1"));
    }

    #[test]
    fn paywall_envelope_matches_published_contract() {
        let product = Product {
            code: ProductCode::new("EVENT_UPGRADE_500").unwrap(),
            price: Price::new(49_00, CurrencyCode::Eur),
            constraints: ProductConstraints::default(),
        };
        let response = PaywallResponse::new(
            PaywallReason::PublishRequiresPayment,
            vec![
                PaymentOption::one_off_credit(&product),
                PaymentOption::ClubAccess,
            ],
            None,
            None,
        );
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"]["code"], "PAYWALL");
        assert_eq!(json["error"]["reason"], "PUBLISH_REQUIRES_PAYMENT");
        assert_eq!(json["error"]["options"][0]["type"], "ONE_OFF_CREDIT");
        assert_eq!(json["error"]["options"][0]["price"], 4900);
        assert_eq!(json["error"]["options"][1]["type"], "CLUB_ACCESS");
        // Plan fields are omitted when unset, not null.
        assert!(json["error"].get("currentPlanId").is_none());
    }

    #[test]
    fn save_request_defaults_optional_fields() {
        let request: SaveEventRequest =
            serde_json::from_str(r#"{"title":"Run","participants":30}"#).unwrap();

        assert!(!request.is_paid);
        assert!(request.club_id.is_none());
        assert!(request.resource_id.is_none());
    }
}
