//! Telegram polling status as reported to status endpoints.

use serde::{Deserialize, Serialize};

/// Connectivity of the Telegram poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BotStatus {
    /// No bot token configured.
    #[default]
    NotConfigured,
    /// Receiving updates.
    Polling,
    /// Waiting before restarting after a polling conflict.
    BackingOff { attempt: u32 },
    /// Not polling and not going to restart.
    Stopped,
}

impl BotStatus {
    /// Short label used by the status endpoint.
    pub fn label(&self) -> &'static str {
        match self {
            BotStatus::NotConfigured => "not_configured",
            BotStatus::Polling => "connected",
            BotStatus::BackingOff { .. } => "reconnecting",
            BotStatus::Stopped => "stopped",
        }
    }

    /// Whether a token is configured at all.
    pub fn is_configured(&self) -> bool {
        !matches!(self, BotStatus::NotConfigured)
    }
}
