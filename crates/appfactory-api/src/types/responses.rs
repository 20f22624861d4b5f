//! Response DTOs for the API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use appfactory_core::ChatReply;
use appfactory_models::AppRecord;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Service status response.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub telegram_bot: String,
    pub cursor_api: String,
    pub active_connections: usize,
    pub conversations: usize,
    pub apps: usize,
    pub timestamp: DateTime<Utc>,
}

/// Send message response.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageResponse {
    pub success: bool,
    pub response: ChatReply,
}

/// An app record with its page link.
#[derive(Debug, Clone, Serialize)]
pub struct AppSummary {
    #[serde(flatten)]
    pub record: AppRecord,
    pub link: String,
}

/// App list response.
#[derive(Debug, Clone, Serialize)]
pub struct AppListResponse {
    pub apps: Vec<AppSummary>,
    pub total: usize,
}
