//! Conversation entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in a conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// Author of the entry.
    #[serde(rename = "type")]
    pub role: Role,
    /// Message text.
    #[serde(rename = "message")]
    pub text: String,
    /// When the entry was produced.
    pub timestamp: DateTime<Utc>,
}

impl ConversationEntry {
    /// Creates a user entry stamped now.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates an assistant entry with an explicit timestamp.
    pub fn assistant(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            timestamp,
        }
    }
}
