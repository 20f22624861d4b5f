//! Core data models for App Factory.
//!
//! This crate provides the plain data types shared by the generator,
//! the HTTP/WebSocket server and the Telegram bot: generated apps, app
//! records, conversations and the events exchanged with web clients.

pub mod app;
pub mod conversation;
pub mod events;
pub mod html;
pub mod slug;
pub mod status;

// Re-export main types
pub use app::{AppRecord, GeneratedApp};
pub use conversation::{ConversationEntry, Role};
pub use events::{ClientEvent, CursorResponse, ServerEvent, TelegramRelayMessage};
pub use html::escape_html;
pub use slug::slugify;
pub use status::BotStatus;
