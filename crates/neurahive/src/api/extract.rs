//! Request extractors with structured rejections.

use axum::extract::{FromRequest, rejection::JsonRejection};

use super::error::ApiError;

/// `axum::Json` whose rejection is a 400 [`ApiError`] with the usual
/// `{error, code}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}
