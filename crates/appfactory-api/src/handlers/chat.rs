//! Chat relay handler.

use axum::{extract::State, Json};

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{SendMessageRequest, SendMessageResponse};

/// POST /api/send-message - Relay a message to the chat API.
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is required".to_string()));
    }

    let reply = state
        .factory
        .chat(&req.message, req.conversation_id.as_deref())
        .await;

    Ok(Json(SendMessageResponse {
        success: true,
        response: reply,
    }))
}
