//! API error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use appfactory_core::{CoreError, PublishError};

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error type; the message becomes the `error` field of the body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Invalid input.
    #[error("{0}")]
    BadRequest(String),

    /// A required integration is not configured.
    #[error("{0}")]
    PreconditionFailed(String),

    /// An upstream service rejected the request.
    #[error("{0}")]
    BadGateway(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));
        (status, body).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        if err.is_missing_credentials() {
            return ApiError::PreconditionFailed(err.to_string());
        }
        match err {
            CoreError::EmptyAppName => ApiError::BadRequest("appName is required".to_string()),
            CoreError::Publish(PublishError::InvalidUrl(msg)) => ApiError::Internal(msg),
            CoreError::Publish(e) => ApiError::BadGateway(e.to_string()),
            CoreError::Cleanup(e) => ApiError::Internal(e.to_string()),
        }
    }
}
