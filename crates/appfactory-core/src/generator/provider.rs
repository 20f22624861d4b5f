//! The text-generation provider seam.

use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by a single provider call.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The HTTP request could not be completed (including timeouts).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("API error {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response did not have the expected shape.
    #[error("unexpected response: {0}")]
    Parse(String),
}

/// A text-generation backend.
///
/// Implementations send a prompt and return the raw completion text;
/// interpreting that text is up to the caller.
#[async_trait]
pub trait CodeProvider: Send + Sync {
    /// Short name used in logs and in the generation source.
    fn name(&self) -> &str;

    /// Sends `prompt` and returns the completion text.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Reads a failed response into [`ProviderError::Status`].
pub(crate) async fn status_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Status { status, body }
}
