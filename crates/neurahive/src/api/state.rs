//! Application state shared across handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::FromRef;

use crate::auth::{AuthConfig, AuthState};
use crate::db::Database;
use crate::user::{UserRepository, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Token verification, login and role checks.
    pub auth: AuthState,
    /// User management.
    pub users: Arc<UserService>,
}

impl AppState {
    pub fn new(auth: AuthState, users: UserService) -> Self {
        Self {
            auth,
            users: Arc::new(users),
        }
    }

    /// Wire auth and user management over one database.
    pub fn from_config(auth_config: &AuthConfig, database: &Database) -> Result<Self> {
        let repo = UserRepository::new(database.pool().clone());
        let auth = AuthState::new(auth_config, Arc::new(repo.clone()))
            .context("Invalid auth configuration")?;
        let users = UserService::new(repo, auth.hasher());
        Ok(Self::new(auth, users))
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
