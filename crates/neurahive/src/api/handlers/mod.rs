//! API request handlers.
//!
//! Organized by domain:
//! - `auth`: login, current identity, token refresh
//! - `users`: admin-only user management
//! - `misc`: health checks

mod auth;
mod misc;
mod users;

pub use auth::{LoginRequest, MeResponse, login, me, refresh};
pub use misc::{HealthResponse, health};
pub use users::{
    create_user, get_user, list_users, set_user_enabled, set_user_roles, update_user,
};
