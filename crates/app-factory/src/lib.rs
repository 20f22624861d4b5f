//! App Factory command-line front end.
//!
//! Wires the factory, the HTTP API and the Telegram bot into one binary.

pub mod cli;
pub mod commands;

/// Loads environment files: the user config file first, then `.env.local`
/// or `.env` in the working directory. Variables already set win.
pub fn load_env() {
    let env_path = appfactory_core::config::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());
}

/// Routes panics through tracing.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(panic = %info, "Panic");
    }));
}
