//! Shared HTTP client construction.

use std::time::Duration;

use tracing::warn;

/// User agent sent on every outbound request (GitHub rejects requests
/// without one).
pub const USER_AGENT: &str = concat!("app-factory/", env!("CARGO_PKG_VERSION"));

/// Builds a reqwest client with the App Factory user agent and an
/// optional request timeout.
pub fn http_client(timeout: Option<Duration>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to build HTTP client, using defaults");
        reqwest::Client::new()
    })
}
