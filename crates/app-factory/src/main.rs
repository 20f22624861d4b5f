//! App Factory entry point.
//!
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx GITHUB_TOKEN=xxx GITHUB_USERNAME=me cargo run -p app-factory -- serve
//! ```

use clap::Parser;
use tracing_subscriber::EnvFilter;

use app_factory::cli::{Cli, Commands};
use app_factory::commands;
use appfactory_core::FactoryConfig;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    app_factory::load_env();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(cli.log_filter()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    app_factory::install_panic_hook();

    let config = FactoryConfig::from_env();

    match cli.command {
        Some(Commands::Serve { host, port, no_bot }) => {
            let config = config.with_listen_address(host, port);
            commands::serve(config, !no_bot, shutdown_signal()).await?;
        }
        None => commands::serve(config, true, shutdown_signal()).await?,
        Some(Commands::Bot) => {
            tokio::select! {
                result = commands::run_bot(config) => result?,
                _ = shutdown_signal() => {}
            }
        }
        Some(Commands::Generate { name, out }) => {
            commands::generate(config, &name, &out).await?;
        }
        Some(Commands::Cleanup { repos }) => commands::cleanup(config, repos).await?,
    }

    Ok(())
}
