//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// App Factory - build and ship small web apps from chat
#[derive(Parser, Debug)]
#[command(name = "app-factory")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API, plus the Telegram bot when a token is configured
    Serve {
        /// Address to bind (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not start the Telegram bot
        #[arg(long)]
        no_bot: bool,
    },

    /// Run only the Telegram bot
    Bot,

    /// Generate an app locally and write its files
    Generate {
        /// App name, e.g. "todo list"
        #[arg(required = true)]
        name: String,

        /// Directory to write into; the app gets its own subdirectory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Delete GitHub repositories (`repo` or `owner/repo`)
    Cleanup {
        #[arg(required = true)]
        repos: Vec<String>,
    },
}

impl Cli {
    /// Default tracing filter for the verbosity level.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "app_factory=info,appfactory_core=info,appfactory_api=info,appfactory_telegram=info,teloxide=warn",
            1 => "app_factory=debug,appfactory_core=debug,appfactory_api=debug,appfactory_telegram=debug,teloxide=info",
            2 => "app_factory=trace,appfactory_core=trace,appfactory_api=trace,appfactory_telegram=trace,teloxide=debug",
            _ => "trace",
        }
    }
}
