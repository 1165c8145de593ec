//! Priced product reference data.
//!
//! Products are the single source of truth for prices, currencies, and the
//! structural constraints a purchase unlocks (e.g. the participant cap a
//! one-off event upgrade covers). They are immutable reference data created
//! by an out-of-scope admin process; this crate only reads them.
//!
//! # Design Decisions
//!
//! - **Money in minor units**: All monetary values are i64 minor units
//!   (cents, öre, ...), never floats
//! - **No cached prices**: Callers surface price/constraint values read from
//!   the catalog at decision time so a catalog change needs no code deploy

use crate::domain::foundation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique, human-readable product key, e.g. `EVENT_UPGRADE_500`.
///
/// Doubles as the credit code: a credit issued for a product carries the
/// product's code and can only be consumed for actions that product covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCode(String);

impl ProductCode {
    /// Creates a product code after validating it is non-empty.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(ValidationError::empty_field("product_code"));
        }
        Ok(Self(code))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A price in integer minor units with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's minor unit (e.g. cents).
    pub amount_minor: i64,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Creates a new price.
    pub fn new(amount_minor: i64, currency_code: CurrencyCode) -> Self {
        Self {
            amount_minor,
            currency_code,
        }
    }
}

/// Supported settlement currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyCode {
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "SEK")]
    Sek,
    #[serde(rename = "USD")]
    Usd,
}

impl CurrencyCode {
    /// Returns the ISO 4217 code.
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Sek => "SEK",
            CurrencyCode::Usd => "USD",
        }
    }

    /// Parses an ISO 4217 code.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_uppercase().as_str() {
            "EUR" => Ok(CurrencyCode::Eur),
            "SEK" => Ok(CurrencyCode::Sek),
            "USD" => Ok(CurrencyCode::Usd),
            other => Err(ValidationError::invalid_format(
                "currency_code",
                format!("unsupported currency: {}", other),
            )),
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structural constraints a product purchase unlocks.
///
/// Absent values mean the product places no bound on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConstraints {
    /// Maximum participants a single credit of this product unlocks.
    ///
    /// For the event upgrade product this is the one-off limit: the largest
    /// event a single prepaid credit can cover.
    pub max_participants: Option<u32>,

    /// Maximum club members the product's plan allows.
    pub max_club_members: Option<u32>,
}

/// Priced product with its constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product key.
    pub code: ProductCode,
    /// Current price, read at decision time.
    pub price: Price,
    /// What the purchase unlocks.
    pub constraints: ProductConstraints,
}

impl Product {
    /// The participant cap this product unlocks, if it bounds one.
    pub fn max_participants(&self) -> Option<u32> {
        self.constraints.max_participants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn product_code_rejects_empty() {
        assert!(ProductCode::new("").is_err());
        assert!(ProductCode::new("   ").is_err());
    }

    #[test]
    fn product_code_accepts_upgrade_key() {
        let code = ProductCode::new("EVENT_UPGRADE_500").unwrap();
        assert_eq!(code.as_str(), "EVENT_UPGRADE_500");
    }

    #[test]
    fn max_participants_comes_from_constraints() {
        assert_eq!(upgrade_product().max_participants(), Some(500));
    }

    #[test]
    fn currency_parse_is_case_insensitive() {
        assert_eq!(CurrencyCode::parse("eur").unwrap(), CurrencyCode::Eur);
        assert!(CurrencyCode::parse("XXX").is_err());
    }

    #[test]
    fn currency_serializes_as_iso_code() {
        let json = serde_json::to_string(&CurrencyCode::Sek).unwrap();
        assert_eq!(json, "\"SEK\"");
    }
}
