//! In-memory conversation log.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use appfactory_models::ConversationEntry;

/// Conversations keyed by conversation id.
#[derive(Debug, Default)]
pub struct ConversationLog {
    entries: RwLock<HashMap<String, Vec<ConversationEntry>>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user message and its assistant reply as one turn.
    ///
    /// Both entries are stamped and pushed under a single write lock, so
    /// turns never interleave and timestamps follow append order.
    pub async fn append_turn(
        &self,
        conversation_id: &str,
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
    ) {
        let mut entries = self.entries.write().await;
        let user = ConversationEntry::user(user_text);
        let assistant = ConversationEntry::assistant(assistant_text, Utc::now());
        let log = entries.entry(conversation_id.to_string()).or_default();
        log.push(user);
        log.push(assistant);
    }

    /// Returns a copy of a conversation; unknown ids yield an empty list.
    pub async fn history(&self, conversation_id: &str) -> Vec<ConversationEntry> {
        self.entries
            .read()
            .await
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of known conversations.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
