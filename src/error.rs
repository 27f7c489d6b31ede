//! Custom error types and handling
//!
//! This module defines the application's error types and implements
//! conversion to HTTP responses for the Axum framework.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Submission gating errors
    #[error("CTF is not active (current status: {status})")]
    CtfNotActive { status: String },

    #[error("Attempt limit of {max_attempts} reached for this CTF")]
    AttemptsExhausted { max_attempts: i32 },

    #[error("CTF already solved; multiple submissions are not allowed")]
    AlreadySolved,

    #[error("This CTF requires a screenshot with every submission")]
    ScreenshotRequired,

    #[error("Edit not allowed: {0}")]
    EditNotAllowed(String),

    // Resource errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    // Infrastructure errors
    #[error("Database error: {0}")]
    Database(String),

    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // Rate limiting
    #[error("Too many requests")]
    TooManyRequests,

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in response
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::CtfNotActive { .. } => "CTF_NOT_ACTIVE",
            Self::AttemptsExhausted { .. } => "ATTEMPTS_EXHAUSTED",
            Self::AlreadySolved => "ALREADY_SOLVED",
            Self::ScreenshotRequired => "SCREENSHOT_REQUIRED",
            Self::EditNotAllowed(_) => "EDIT_NOT_ALLOWED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Redis(_) => "REDIS_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidToken | Self::TokenExpired | Self::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) | Self::ScreenshotRequired => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::CtfNotActive { .. }
            | Self::AttemptsExhausted { .. }
            | Self::AlreadySolved
            | Self::EditNotAllowed(_)
            | Self::ConcurrentModification(_) => StatusCode::CONFLICT,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::Database(_) | Self::Redis(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable context for gating errors, rendered into the
    /// response body so the UI can show a precise message.
    fn gate_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::CtfNotActive { status } => Some(serde_json::json!({ "status": status })),
            Self::AttemptsExhausted { max_attempts } => {
                Some(serde_json::json!({ "max_attempts": max_attempts, "remaining_attempts": 0 }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal errors but don't expose details to clients
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "A database error occurred".to_string()
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                "A storage error occurred".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.error_code().to_string(),
                message,
                details: self.gate_details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// Implement From for common error types
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique violations surface when two writers race a
                // terminal transition or an attempt-number slot.
                if db_err.is_unique_violation() {
                    AppError::ConcurrentModification(
                        "Resource was modified concurrently".to_string(),
                    )
                } else {
                    AppError::Database(db_err.to_string())
                }
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Redis(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gating_errors_map_to_conflict() {
        let err = AppError::CtfNotActive {
            status: "inactive".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "CTF_NOT_ACTIVE");

        let err = AppError::AttemptsExhausted { max_attempts: 3 };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "ATTEMPTS_EXHAUSTED");

        assert_eq!(AppError::AlreadySolved.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_gate_details_present() {
        let err = AppError::AttemptsExhausted { max_attempts: 5 };
        let details = err.gate_details().unwrap();
        assert_eq!(details["max_attempts"], 5);

        let err = AppError::CtfNotActive {
            status: "upcoming".to_string(),
        };
        assert_eq!(err.gate_details().unwrap()["status"], "upcoming");

        assert!(AppError::AlreadySolved.gate_details().is_none());
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = AppError::Validation("bad time string".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
