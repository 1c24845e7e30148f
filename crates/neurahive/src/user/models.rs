//! User data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::RoleSet;

/// User entity from database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: RoleSet,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
    pub last_login_at: Option<String>,
}

/// Public user info (safe to return to clients).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: RoleSet,
    pub enabled: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            enabled: user.enabled,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Request to create a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: RoleSet,
}

/// Body of `PUT /users/{id}`: replaces every editable field.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: RoleSet,
}

/// A validated user ready to be written; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: RoleSet,
}

/// User list query parameters.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UserListQuery {
    pub enabled: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Body of `PUT /users/{id}/enabled`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// Body of `PUT /users/{id}/roles`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRolesRequest {
    pub role: RoleSet,
}
