//! Entitlement and billing HTTP API.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AuthenticatedUser, BillingAppState, EntitlementApiError};
pub use routes::{api_router, entitlement_routes};
