//! Authentication handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::auth::{AuthError, Authenticated, CurrentUser, Identity, TokenResponse};

use crate::api::error::ApiResult;
use crate::api::extract::ApiJson;
use crate::api::state::AppState;

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of `GET /auth/me`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MeResponse {
    User(CurrentUser),
    Bypass { bypass: bool },
}

/// Exchange email and password for an access token.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(token))
}

/// Current identity, freshly read from the credential store.
pub async fn me(Authenticated(identity): Authenticated) -> Json<MeResponse> {
    match identity {
        Identity::User(user) => Json(MeResponse::User(user)),
        Identity::Bypass => Json(MeResponse::Bypass { bypass: true }),
    }
}

/// Issue a fresh token carrying the caller's current roles.
#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
) -> Result<Json<TokenResponse>, AuthError> {
    Ok(Json(state.auth.refresh(&identity)?))
}
