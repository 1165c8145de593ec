//! Gatherly billing service entrypoint.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use gatherly_billing::adapters::http::entitlement::{api_router, BillingAppState};
use gatherly_billing::adapters::memory::{InMemoryResourceService, StaticClubService};
use gatherly_billing::adapters::postgres::{PostgresCreditLedger, PostgresProductCatalog};
use gatherly_billing::application::handlers::entitlement::PolicySettings;
use gatherly_billing::config::AppConfig;
use gatherly_billing::domain::catalog::ProductCode;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let settings = PolicySettings {
        free_event_participants: config.billing.free_event_participants,
        event_upgrade_product_code: ProductCode::new(
            config.billing.event_upgrade_product_code.as_str(),
        )?,
    };

    // The resource and club collaborators are separate platform services;
    // the in-memory stand-ins keep the binary runnable for local
    // development until their service clients are wired in.
    let state = BillingAppState {
        catalog: Arc::new(PostgresProductCatalog::new(pool.clone())),
        ledger: Arc::new(PostgresCreditLedger::new(pool)),
        resources: Arc::new(InMemoryResourceService::new()),
        clubs: Arc::new(StaticClubService::new()),
        settings,
    };

    let cors = build_cors_layer(&config);

    let app = api_router()
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_secs,
                )))
                .layer(cors),
        )
        .with_state(state);

    let addr = config.server.socket_addr();
    tracing::info!(%addr, environment = ?config.server.environment, "gatherly billing listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
