//! Subcommand implementations.

use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use appfactory_api::{serve as serve_api, ApiConfig, AppState};
use appfactory_core::{CoreError, Factory, FactoryConfig, GenerationSource};
use appfactory_models::{slugify, GeneratedApp};
use appfactory_telegram::{TelegramBot, TelegramError};

/// Errors surfaced by subcommands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Telegram(#[from] TelegramError),

    #[error("Refusing to write outside the output directory: {0}")]
    UnsafePath(String),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Runs the HTTP API until `shutdown` resolves, with the bot alongside
/// when a token is configured.
pub async fn serve<F>(mut config: FactoryConfig, with_bot: bool, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let api = ApiConfig::from_factory(&config);
    // No token leaves the bot NotConfigured.
    if !with_bot {
        config.telegram_token = None;
    }
    let factory = Arc::new(Factory::new(config));
    factory.log_integrations();

    let bot_task = match TelegramBot::new(Arc::clone(&factory)) {
        Ok(bot) => Some(tokio::spawn(async move {
            if let Err(e) = bot.run().await {
                error!(error = %e, "Telegram bot exited");
            }
        })),
        Err(TelegramError::NoToken) => {
            info!("TELEGRAM_BOT_TOKEN not set, running without the bot");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let state = AppState::new(api.clone(), factory);
    let result = serve_api(api, state, shutdown).await;

    if let Some(task) = bot_task {
        task.abort();
    }
    result?;
    info!("Server stopped");
    Ok(())
}

/// Runs only the Telegram bot.
pub async fn run_bot(config: FactoryConfig) -> Result<()> {
    let factory = Arc::new(Factory::new(config));
    factory.log_integrations();
    let bot = TelegramBot::new(factory)?;

    match bot.get_me().await {
        Ok(username) => {
            println!("\n[robot] App Factory Telegram Bot");
            println!("   Bot: @{}", username);
        }
        Err(e) => {
            error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    bot.run().await?;
    Ok(())
}

/// Generates an app and writes it to `out/<slug>`; returns that directory.
pub async fn generate(config: FactoryConfig, name: &str, out: &Path) -> Result<PathBuf> {
    let factory = Factory::new(config);
    let outcome = factory.generator().generate(name).await;

    match &outcome.source {
        GenerationSource::Provider { name: provider } => {
            info!(provider = %provider, "Generated by provider");
        }
        GenerationSource::Template {
            template, reason, ..
        } => {
            info!(?template, ?reason, "Generated from template");
        }
    }

    let dir = out.join(slugify(name));
    write_app(&dir, &outcome.app)?;
    println!("Wrote {} files to {}", outcome.app.len(), dir.display());
    Ok(dir)
}

/// Writes every file of `app` below `dir`.
pub fn write_app(dir: &Path, app: &GeneratedApp) -> Result<()> {
    for (path, content) in app.iter() {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(CommandError::UnsafePath(path.to_string()));
        }

        let target = dir.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, content)?;
    }
    Ok(())
}

/// Deletes the given repositories and prints a summary.
pub async fn cleanup(config: FactoryConfig, repos: Vec<String>) -> Result<()> {
    let factory = Factory::new(config);
    let summary = factory.cleanup(Some(repos)).await?;

    for repo in &summary.deleted {
        println!("deleted    {}", repo);
    }
    for repo in &summary.not_found {
        println!("not found  {}", repo);
    }
    for failure in &summary.failed {
        warn!(repo = %failure.repo, error = %failure.error, "Delete failed");
        println!("failed     {}: {}", failure.repo, failure.error);
    }
    Ok(())
}
