//! Remediation options attached to paywall rejections.
//!
//! The set of ways a rejected action can be unlocked is fixed, so it is a
//! closed sum type that callers match exhaustively, serialized with a `type`
//! tag for the API payload.

use crate::domain::catalog::{CurrencyCode, Product, ProductCode};
use serde::{Deserialize, Serialize};

/// A priced (or plan-based) way out of a paywall rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum PaymentOption {
    /// Buy a single-use credit that unlocks this save.
    ///
    /// Price and currency are read from the product catalog at decision
    /// time, never cached.
    OneOffCredit {
        product_code: ProductCode,
        price: i64,
        currency_code: CurrencyCode,
    },

    /// Get or upgrade a club subscription.
    ClubAccess,
}

impl PaymentOption {
    /// Builds the one-off credit option from the catalog product.
    pub fn one_off_credit(product: &Product) -> Self {
        PaymentOption::OneOffCredit {
            product_code: product.code.clone(),
            price: product.price.amount_minor,
            currency_code: product.price.currency_code,
        }
    }

    /// Returns true for the one-off credit variant.
    pub fn is_one_off_credit(&self) -> bool {
        matches!(self, PaymentOption::OneOffCredit { .. })
    }

    /// Returns true for the club access variant.
    pub fn is_club_access(&self) -> bool {
        matches!(self, PaymentOption::ClubAccess)
    }
}
