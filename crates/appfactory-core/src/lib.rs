//! Core business logic for App Factory.
//!
//! This crate turns an app request into a published, deployed project:
//!
//! - [`command`]: natural-language request parsing
//! - [`generator`]: AI code generation with a static-template fallback
//! - [`github`]: repository creation, file writes and deletion
//! - [`deployer`]: Render service creation
//! - [`relay`]: chat-completion relay
//! - [`factory`]: the shared service tying the pipeline and state together

pub mod cleanup;
pub mod command;
pub mod config;
pub mod conversation;
pub mod deployer;
pub mod error;
pub mod factory;
pub mod generator;
pub mod github;
pub mod http;
pub mod registry;
pub mod relay;

pub use cleanup::{CleanupFailure, CleanupSummary};
pub use command::{extract_app_name, is_app_request};
pub use config::FactoryConfig;
pub use deployer::Deployment;
pub use error::{CleanupError, CoreError, PublishError, Result};
pub use factory::{CreatedApp, Factory};
pub use generator::{CodeGenerator, GenerationOutcome, GenerationSource};
pub use github::FileFailure;
pub use relay::ChatReply;
