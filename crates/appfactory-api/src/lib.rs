//! HTTP and WebSocket API for App Factory.
//!
//! This crate exposes the factory to web clients:
//! - status and health endpoints
//! - chat relay (`/api/send-message`) and the `/ws` event channel
//! - app creation, listing, app pages and repository cleanup
//!
//! # Example
//!
//! ```ignore
//! use appfactory_api::{serve, ApiConfig, AppState};
//! use appfactory_core::{Factory, FactoryConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FactoryConfig::from_env();
//!     let api = ApiConfig::from_factory(&config);
//!     let state = AppState::new(api.clone(), Arc::new(Factory::new(config)));
//!
//!     serve(api, state, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;
pub mod ws;

pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use router::{create_router, serve};
pub use state::AppState;
