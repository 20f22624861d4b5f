//! Error types for the core crate.

use thiserror::Error;

/// Errors from the GitHub repository client.
#[derive(Error, Debug)]
pub enum PublishError {
    /// `GITHUB_TOKEN` or `GITHUB_USERNAME` is not set.
    #[error("GitHub credentials not configured (set GITHUB_TOKEN and GITHUB_USERNAME)")]
    MissingCredentials,

    /// GitHub answered with a non-success status.
    #[error("GitHub API error {status}: {body}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The HTTP request could not be completed.
    #[error("GitHub request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A request URL could not be built.
    #[error("invalid GitHub URL: {0}")]
    InvalidUrl(String),
}

/// Errors from the repository cleanup operation.
#[derive(Error, Debug)]
pub enum CleanupError {
    /// `GITHUB_TOKEN` or `GITHUB_USERNAME` is not set.
    #[error("GitHub credentials not configured (set GITHUB_TOKEN and GITHUB_USERNAME)")]
    MissingCredentials,
}

/// Errors from factory operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The requested app name is blank.
    #[error("app name must not be empty")]
    EmptyAppName,

    /// Publishing the generated app failed.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Cleanup could not start.
    #[error(transparent)]
    Cleanup(#[from] CleanupError),
}

impl CoreError {
    /// Whether the error is a missing-credential precondition failure.
    pub fn is_missing_credentials(&self) -> bool {
        matches!(
            self,
            CoreError::Publish(PublishError::MissingCredentials)
                | CoreError::Cleanup(CleanupError::MissingCredentials)
        )
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
