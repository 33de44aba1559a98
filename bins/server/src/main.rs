//! Bukubesar API server.
//!
//! Loads configuration, connects to `PostgreSQL` and serves the ledger API.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bukubesar_api::{AppState, create_router};
use bukubesar_db::connect_with;
use bukubesar_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bukubesar=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let jwt_service = JwtService::new(&config.jwt);
    info!(
        company = %config.reports.company_name,
        currency = %config.reports.currency,
        "Report settings loaded"
    );

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        reports: Arc::new(config.reports.clone()),
    };

    let app = create_router(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
