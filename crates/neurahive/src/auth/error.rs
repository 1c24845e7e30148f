//! Authentication errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Authentication and authorization errors.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Missing authorization header.
    #[error("missing authorization header")]
    MissingAuthHeader,

    /// Invalid authorization header format.
    #[error("invalid authorization header format")]
    InvalidAuthHeader,

    /// Invalid token (bad signature, malformed, wrong algorithm).
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token expired.
    #[error("token expired")]
    TokenExpired,

    /// Subject claim is not a positive integer.
    #[error("invalid token subject")]
    InvalidSubject,

    /// Subject does not resolve to a stored user.
    #[error("user not found")]
    UserNotFound,

    /// Subject resolves to a disabled user.
    #[error("user disabled")]
    UserDisabled,

    /// Invalid credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Insufficient permissions.
    #[error("insufficient permissions: {0}")]
    InsufficientPermissions(String),

    /// Internal error.
    #[error("internal auth error: {0}")]
    Internal(String),
}

/// Coarse outcome class of an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    Unauthenticated,
    Forbidden,
    Internal,
}

impl AuthError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::InsufficientPermissions(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> AuthFailure {
        match self {
            AuthError::InsufficientPermissions(_) => AuthFailure::Forbidden,
            AuthError::Internal(_) => AuthFailure::Internal,
            _ => AuthFailure::Unauthenticated,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            AuthFailure::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthFailure::Forbidden => StatusCode::FORBIDDEN,
            AuthFailure::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidToken(_) | AuthError::InvalidSubject => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            // Account state is not disclosed to the caller.
            AuthError::UserNotFound | AuthError::UserDisabled | AuthError::InvalidCredentials => {
                "invalid_credentials"
            }
            AuthError::InsufficientPermissions(_) => "insufficient_permissions",
            AuthError::Internal(_) => "internal_error",
        }
    }

    fn public_message(&self) -> String {
        match self {
            AuthError::UserNotFound | AuthError::UserDisabled => {
                AuthError::InvalidCredentials.to_string()
            }
            AuthError::InvalidToken(_) => "invalid token".to_string(),
            AuthError::InsufficientPermissions(_) => {
                "you do not have access to this resource".to_string()
            }
            AuthError::Internal(_) => "internal auth error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub error_code: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.kind() == AuthFailure::Internal {
            tracing::error!(error = %self, "auth internal error");
        }

        let body = Json(AuthErrorResponse {
            error: self.public_message(),
            error_code: self.error_code().to_string(),
        });

        (status, body).into_response()
    }
}
