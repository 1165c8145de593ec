//! Axum router configuration for entitlement and billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_product, list_credits, save_event, BillingAppState};

/// Create the entitlement API router.
///
/// # Routes
///
/// - `POST /events` - Save an event (entitlement enforced; honors
///   `confirm_credit=1` and an optional `Idempotency-Key` header)
/// - `GET /credits` - List the current user's available credits
/// - `GET /products/:code` - Look up a catalog product
pub fn entitlement_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/events", post(save_event))
        .route("/credits", get(list_credits))
        .route("/products/:code", get(get_product))
}

/// Create the complete API router, suitable for mounting at `/api`.
pub fn api_router() -> Router<BillingAppState> {
    Router::new().nest("/api", entitlement_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::memory::{
        InMemoryCreditLedger, InMemoryProductCatalog, InMemoryResourceService, StaticClubService,
    };
    use crate::application::handlers::entitlement::PolicySettings;
    use crate::domain::catalog::ProductCode;

    fn test_state() -> BillingAppState {
        BillingAppState {
            catalog: Arc::new(InMemoryProductCatalog::with_standard_products()),
            ledger: Arc::new(InMemoryCreditLedger::new()),
            resources: Arc::new(InMemoryResourceService::new()),
            clubs: Arc::new(StaticClubService::new()),
            settings: PolicySettings {
                free_event_participants: 50,
                event_upgrade_product_code: ProductCode::new("EVENT_UPGRADE_500").unwrap(),
            },
        }
    }

    #[test]
    fn entitlement_routes_creates_router() {
        let router = entitlement_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn api_router_creates_combined_router() {
        let router = api_router();
        let _: Router<()> = router.with_state(test_state());
    }
}
