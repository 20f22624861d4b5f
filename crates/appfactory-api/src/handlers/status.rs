//! Status and health handlers.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::state::AppState;
use crate::types::{HealthResponse, StatusResponse};

/// GET /api/health - Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.factory.uptime().as_secs(),
        timestamp: Utc::now(),
    })
}

/// GET /api/status - Integration and connection status.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let factory = &state.factory;
    let cursor_api = if factory.relay().is_configured() {
        "configured"
    } else {
        "mock_mode"
    };

    Json(StatusResponse {
        status: "running".to_string(),
        telegram_bot: factory.bot_status().await.label().to_string(),
        cursor_api: cursor_api.to_string(),
        active_connections: state.connection_count().await,
        conversations: factory.conversations().len().await,
        apps: factory.registry().len().await,
        timestamp: Utc::now(),
    })
}
