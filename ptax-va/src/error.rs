//! Error types for ptax-va
//!
//! Handler errors render as `{"error": {"code", "message"}}` with the HTTP
//! status that matches the failure class.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::providers::ProviderError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request or missing address (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Subject property not found (404)
    #[error("Property not found: {0}")]
    NotFound(String),

    /// Upstream data provider quota exhausted (429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// ptax-common error
    #[error("Common error: {0}")]
    Common(#[from] ptax_common::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::InvalidInput(msg) => ApiError::BadRequest(msg),
            ProviderError::NotFound(address) => ApiError::NotFound(address),
            ProviderError::RateLimited => {
                ApiError::RateLimited("property data provider quota exhausted".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::NotFound(address) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!(
                    "No property record found for '{}'. Please check the address and try again.",
                    address
                ),
            ),
            ApiError::RateLimited(_) => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Property data service is busy. Please try again later.".to_string(),
            ),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Analysis failed due to an unexpected error.".to_string(),
                )
            }
            ApiError::Common(ref err) => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMMON_ERROR",
                    err.to_string(),
                )
            }
            ApiError::Other(ref err) => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    err.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
