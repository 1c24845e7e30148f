//! Credential store contract consumed by the auth core.

use anyhow::Result;
use async_trait::async_trait;

use crate::user::User;

/// Read access to persisted user records.
///
/// Each call is a single, self-contained read; errors are reported through
/// the returned `Result`, separately from "no such user".
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by id.
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Look up a user by email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Record a successful login.
    async fn record_login(&self, _id: i64) -> Result<()> {
        Ok(())
    }
}
