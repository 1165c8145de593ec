//! Billing and entitlement configuration
//!
//! Only the free participant limit lives here. The one-off limit and price
//! are read from the product catalog at decision time so price changes take
//! effect without a deploy.

use serde::Deserialize;

use super::error::ValidationError;

/// Billing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Participants allowed on a personal event without any payment
    #[serde(default = "default_free_event_participants")]
    pub free_event_participants: u32,

    /// Product whose constraint defines the one-off limit
    #[serde(default = "default_event_upgrade_product_code")]
    pub event_upgrade_product_code: String,
}

impl BillingConfig {
    /// Validate billing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.free_event_participants == 0 {
            return Err(ValidationError::InvalidFreeLimit);
        }
        if self.event_upgrade_product_code.trim().is_empty() {
            return Err(ValidationError::InvalidProductCode);
        }
        Ok(())
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            free_event_participants: default_free_event_participants(),
            event_upgrade_product_code: default_event_upgrade_product_code(),
        }
    }
}

fn default_free_event_participants() -> u32 {
    50
}

fn default_event_upgrade_product_code() -> String {
    "EVENT_UPGRADE_500".to_string()
}
