//! Telegram bot interface for App Factory.
//!
//! The bot turns chat messages into apps and relays everything else to the
//! chat API.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//!
//! Optional:
//! - `TELEGRAM_ADMIN_IDS`: Comma-separated chat ids allowed to run `/cleanup`
//!
//! # Example
//!
//! ```no_run
//! use appfactory_core::{Factory, FactoryConfig};
//! use appfactory_telegram::TelegramBot;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let factory = Arc::new(Factory::new(FactoryConfig::from_env()));
//!     let bot = TelegramBot::new(factory)?;
//!     bot.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! - `/start` - Welcome message
//! - `/help` - Usage and command list
//! - `/status` - Bot, generator, chat and deployment status
//! - `/cleanup [repo ...]` - Delete app repositories (admins only)

pub mod bot;
pub mod error;
pub mod handlers;
pub mod messages;
pub mod reconnect;

pub use bot::TelegramBot;
pub use error::{Result, TelegramError};
pub use handlers::Command;
pub use reconnect::{PollState, ReconnectPolicy, RunOutcome, Supervisor};
