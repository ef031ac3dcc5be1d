//! Error types for Redscope
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for configuration, data, and upstream agent failures
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingPostId,

    // Data errors (4xxx)
    PostNotFound,
    MissingColumn,
    DatasetLoadError,

    // Rate limiting (6xxx)
    RateLimited,

    // Upstream agent errors (8xxx)
    AgentRateLimited,
    AgentAuthFailed,
    AgentMalformedResponse,
    AgentUnavailable,
    AgentTimeout,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
    TemplateError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingPostId => 1002,

            ErrorCode::PostNotFound => 4001,
            ErrorCode::MissingColumn => 4002,
            ErrorCode::DatasetLoadError => 4003,

            ErrorCode::RateLimited => 6001,

            ErrorCode::AgentRateLimited => 8001,
            ErrorCode::AgentAuthFailed => 8002,
            ErrorCode::AgentMalformedResponse => 8003,
            ErrorCode::AgentUnavailable => 8004,
            ErrorCode::AgentTimeout => 8005,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
            ErrorCode::TemplateError => 9004,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("No post ID provided.")]
    MissingPostId,

    // Data errors
    #[error("Post not found.")]
    PostNotFound { id: String },

    #[error("Dataset has no column named '{column}'")]
    MissingColumn { column: String },

    #[error("Failed to load dataset from {path}: {message}")]
    DatasetLoad { path: String, message: String },

    // Rate limiting
    #[error("Too many questions; limit is {limit} per second")]
    RateLimited { limit: u32 },

    // Upstream agent errors
    #[error("The reasoning service is rate limiting requests: {message}")]
    AgentRateLimited { message: String },

    #[error("The reasoning service rejected the API key (HTTP {status})")]
    AgentAuth { status: u16 },

    #[error("The reasoning service returned an unreadable response: {message}")]
    AgentMalformed { message: String },

    #[error("The reasoning service is unavailable: {message}")]
    AgentUnavailable { status: Option<u16>, message: String },

    #[error("The reasoning service did not answer within {timeout_secs}s")]
    AgentTimeout { timeout_secs: u64 },

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Template error: {message}")]
    Template { message: String },

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingPostId => ErrorCode::MissingPostId,
            AppError::PostNotFound { .. } => ErrorCode::PostNotFound,
            AppError::MissingColumn { .. } => ErrorCode::MissingColumn,
            AppError::DatasetLoad { .. } => ErrorCode::DatasetLoadError,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::AgentRateLimited { .. } => ErrorCode::AgentRateLimited,
            AppError::AgentAuth { .. } => ErrorCode::AgentAuthFailed,
            AppError::AgentMalformed { .. } => ErrorCode::AgentMalformedResponse,
            AppError::AgentUnavailable { .. } => ErrorCode::AgentUnavailable,
            AppError::AgentTimeout { .. } => ErrorCode::AgentTimeout,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Template { .. } => ErrorCode::TemplateError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } | AppError::MissingPostId => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::PostNotFound { .. } => StatusCode::NOT_FOUND,

            // 429 Too Many Requests
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::MissingColumn { .. }
            | AppError::DatasetLoad { .. }
            | AppError::Internal { .. }
            | AppError::Serialization(_)
            | AppError::Template { .. }
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::AgentRateLimited { .. }
            | AppError::AgentAuth { .. }
            | AppError::AgentMalformed { .. }
            | AppError::AgentUnavailable { .. } => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable
            AppError::Configuration { .. } => StatusCode::SERVICE_UNAVAILABLE,

            // 504 Gateway Timeout
            AppError::AgentTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Check if this error came from the reasoning service
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::AgentRateLimited { .. }
                | AppError::AgentAuth { .. }
                | AppError::AgentMalformed { .. }
                | AppError::AgentUnavailable { .. }
                | AppError::AgentTimeout { .. }
        )
    }

    /// Upstream failures worth another attempt
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::AgentRateLimited { .. } | AppError::AgentTimeout { .. } => true,
            AppError::AgentUnavailable { status, .. } => status.map_or(true, |s| s >= 500),
            _ => false,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Label used for metrics
    pub fn kind(&self) -> &'static str {
        match self.code() {
            ErrorCode::AgentRateLimited => "rate_limited",
            ErrorCode::AgentAuthFailed => "auth",
            ErrorCode::AgentMalformedResponse => "malformed",
            ErrorCode::AgentUnavailable => "unavailable",
            ErrorCode::AgentTimeout => "timeout",
            _ => "other",
        }
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Log the error at a level matching its severity
pub fn log_error(err: &AppError) {
    let status = err.status_code();
    if err.is_server_error() {
        tracing::error!(
            error = %err,
            code = ?err.code(),
            status = status.as_u16(),
            "Server error"
        );
    } else if err.is_client_error() {
        tracing::warn!(
            error = %err,
            code = ?err.code(),
            status = status.as_u16(),
            "Client error"
        );
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log_error(&self);

        let details = match &self {
            AppError::PostNotFound { id } => Some(serde_json::json!({ "id": id })),
            AppError::MissingColumn { column } => Some(serde_json::json!({ "column": column })),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.code(),
                message: self.to_string(),
                details,
            },
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Internal {
            message: format!("CSV error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::PostNotFound { id: "xyz".into() };
        assert_eq!(err.code(), ErrorCode::PostNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Post not found.");
    }

    #[test]
    fn test_missing_post_id_is_client_error() {
        let err = AppError::MissingPostId;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_upstream_classification() {
        let limited = AppError::AgentRateLimited { message: "quota".into() };
        assert!(limited.is_upstream());
        assert!(limited.is_transient());

        let auth = AppError::AgentAuth { status: 401 };
        assert!(auth.is_upstream());
        assert!(!auth.is_transient());

        let bad_request = AppError::AgentUnavailable { status: Some(400), message: "bad".into() };
        assert!(!bad_request.is_transient());

        let outage = AppError::AgentUnavailable { status: Some(503), message: "down".into() };
        assert!(outage.is_transient());

        let config = AppError::Configuration { message: "missing key".into() };
        assert!(!config.is_upstream());
    }

    #[test]
    fn test_numeric_codes_are_distinct() {
        let codes = [
            ErrorCode::PostNotFound,
            ErrorCode::MissingColumn,
            ErrorCode::AgentRateLimited,
            ErrorCode::ConfigurationError,
        ];
        let mut numeric: Vec<u16> = codes.iter().map(|c| c.as_code()).collect();
        numeric.dedup();
        assert_eq!(numeric.len(), codes.len());
    }
}
