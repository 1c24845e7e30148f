//! User management handlers (admin only).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::{info, instrument};

use crate::auth::RequireAdmin;
use crate::user::{
    CreateUserRequest, SetEnabledRequest, SetRolesRequest, UpdateUserRequest, UserInfo,
    UserListQuery,
};

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ApiJson;
use crate::api::state::AppState;

/// List users.
#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<Vec<UserInfo>>> {
    let users = state.users.list_users(query).await?;

    let user_infos: Vec<UserInfo> = users.into_iter().map(UserInfo::from).collect();
    info!(count = user_infos.len(), "Listed users");
    Ok(Json(user_infos))
}

/// Get a specific user.
#[instrument(skip(state, _admin))]
pub async fn get_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserInfo>> {
    state
        .users
        .get_user(user_id)
        .await?
        .map(|u| Json(u.into()))
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", user_id)))
}

/// Create a new user.
#[instrument(skip(state, _admin, request), fields(email = %request.email))]
pub async fn create_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    let user = state.users.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Replace a user's name, email, password and roles.
#[instrument(skip(state, _admin, request), fields(email = %request.email))]
pub async fn update_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(user_id): Path<i64>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserInfo>> {
    let user = state.users.update_user(user_id, request).await?;
    Ok(Json(user.into()))
}

/// Enable or disable a user.
#[instrument(skip(state, _admin, request))]
pub async fn set_user_enabled(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(user_id): Path<i64>,
    ApiJson(request): ApiJson<SetEnabledRequest>,
) -> ApiResult<Json<UserInfo>> {
    let user = state.users.set_enabled(user_id, request.enabled).await?;
    Ok(Json(user.into()))
}

/// Replace a user's roles.
#[instrument(skip(state, _admin, request))]
pub async fn set_user_roles(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(user_id): Path<i64>,
    ApiJson(request): ApiJson<SetRolesRequest>,
) -> ApiResult<Json<UserInfo>> {
    let user = state.users.set_roles(user_id, request.role).await?;
    Ok(Json(user.into()))
}
