//! Unified API error handling with structured responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::AuthError;

/// API error type with structured responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// Authentication and authorization failures keep their own body shape.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => err.status_code(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Auth(err) => err.error_code(),
        }
    }

    /// Categorize an anyhow error into the appropriate ApiError variant.
    ///
    /// Database errors are internal unless they are a unique violation.
    /// Otherwise, patterns recognized:
    /// - "not found" -> NotFound
    /// - "already registered" / "already exists" / "unique constraint" -> Conflict
    /// - "invalid" / "must be" / "cannot" -> BadRequest
    /// - Default -> Internal
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        if let Some(auth) = err.downcast_ref::<AuthError>() {
            return ApiError::Auth(auth.clone());
        }

        for cause in err.chain() {
            if let Some(sqlx_error) = cause.downcast_ref::<sqlx::Error>() {
                if let sqlx::Error::Database(db_err) = sqlx_error
                    && db_err.is_unique_violation()
                {
                    return ApiError::conflict("Resource already exists.");
                }
                return ApiError::Internal(format!("{err:#}"));
            }
        }

        let msg = err.to_string();
        let full = format!("{err:#}").to_lowercase();

        if full.contains("not found") {
            ApiError::NotFound(msg)
        } else if full.contains("already registered")
            || full.contains("already exists")
            || full.contains("unique constraint")
        {
            ApiError::Conflict(msg)
        } else if full.contains("invalid") || full.contains("must be") || full.contains("cannot")
        {
            ApiError::BadRequest(msg)
        } else {
            ApiError::Internal(format!("{err:#}"))
        }
    }
}

/// Structured error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Auth(err) => return err.into_response(),
            other => (other.status_code(), other.error_code(), other.to_string()),
        };

        if status.is_server_error() {
            error!(error_code = code, message = %message, "API error");
        } else {
            debug!(error_code = code, message = %message, "Client error");
        }

        // Internal details stay in the log.
        let error = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            message
        };

        (status, Json(ErrorResponse { error, code })).into_response()
    }
}

/// Convert anyhow errors to API errors using the centralized categorization logic.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::from_anyhow(err)
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
