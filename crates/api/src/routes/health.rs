//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// `up` when the database answers a ping.
    pub database: &'static str,
}

/// Health check handler. Always 200; a failed ping only marks the service degraded.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_up = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            false
        }
    };

    Json(HealthResponse {
        status: if database_up { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if database_up { "up" } else { "down" },
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
