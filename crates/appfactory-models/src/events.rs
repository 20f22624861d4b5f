//! Events exchanged with web clients over the bidirectional channel.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conversation::ConversationEntry;

/// Events sent by a web client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// A chat message to relay to the assistant.
    WebMessage {
        message: String,
        #[serde(rename = "conversationId", default)]
        conversation_id: Option<String>,
    },
    /// Request the history of a conversation.
    GetConversation(String),
}

/// Events sent to web clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Assistant reply to a `web_message`.
    CursorResponse(CursorResponse),
    /// A chat relayed through the Telegram bot.
    TelegramMessage(TelegramRelayMessage),
    /// Stored entries of a conversation, in append order.
    ConversationHistory(Vec<ConversationEntry>),
    /// A request could not be processed.
    Error { message: String },
}

/// Assistant reply payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorResponse {
    pub id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: serde_json::Value,
}

/// A Telegram chat turn mirrored to web clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramRelayMessage {
    pub id: i32,
    pub chat_id: i64,
    pub user_id: u64,
    pub username: String,
    pub text: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}
