//! User service for business logic.

use anyhow::{Result, bail};
use tracing::{info, instrument, warn};

use super::models::{CreateUserRequest, NewUser, UpdateUserRequest, User, UserListQuery};
use super::repository::UserRepository;
use crate::auth::{MAX_PASSWORD_BYTES, PasswordHasher, RoleSet};

/// Minimum password length accepted on creation.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Service for user management operations.
#[derive(Debug, Clone)]
pub struct UserService {
    repo: UserRepository,
    hasher: PasswordHasher,
}

impl UserService {
    /// Create a new user service.
    pub fn new(repo: UserRepository, hasher: PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    pub fn repository(&self) -> &UserRepository {
        &self.repo
    }

    /// Create a new user with validation.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        let user = self
            .prepare(None, request.name, request.email, request.password, request.role)
            .await?;

        let user = self.repo.create(user).await?;
        info!(user_id = user.id, email = %user.email, role = %user.role, "Created new user");

        Ok(user)
    }

    /// Replace a user's name, email, password and roles.
    ///
    /// Same validation as creation; the password is re-hashed.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn update_user(&self, id: i64, request: UpdateUserRequest) -> Result<User> {
        if self.repo.get(id).await?.is_none() {
            bail!("User not found: {}", id);
        }

        let user = self
            .prepare(Some(id), request.name, request.email, request.password, request.role)
            .await?;

        let user = self.repo.update(id, user).await?;
        info!(user_id = user.id, email = %user.email, role = %user.role, "Updated user");

        Ok(user)
    }

    /// Validate user fields and hash the password. `owner` is the user the
    /// email may already belong to.
    async fn prepare(
        &self,
        owner: Option<i64>,
        name: String,
        email: String,
        password: String,
        role: RoleSet,
    ) -> Result<NewUser> {
        let email = email.trim().to_string();
        let name = name.trim().to_string();

        if name.is_empty() {
            bail!("Name cannot be empty.");
        }

        if !is_valid_email(&email) {
            bail!("Invalid email format.");
        }

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            bail!("Password must be at least {MIN_PASSWORD_LENGTH} characters.");
        }

        if password.len() > MAX_PASSWORD_BYTES {
            bail!("Password must be at most {MAX_PASSWORD_BYTES} bytes.");
        }

        if role.is_empty() {
            bail!("Role set must be non-empty.");
        }

        if let Some(existing) = self.repo.get_by_email(&email).await?
            && Some(existing.id) != owner
        {
            bail!("Email '{}' is already registered.", email);
        }

        let password_hash = self.hasher.hash_async(password).await?;

        Ok(NewUser {
            name,
            email,
            password_hash,
            role,
        })
    }

    /// Get a user by ID.
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.repo.get(id).await
    }

    /// List users with optional filters.
    #[instrument(skip(self))]
    pub async fn list_users(&self, query: UserListQuery) -> Result<Vec<User>> {
        self.repo.list(query).await
    }

    /// Enable or disable a user. Takes effect on the user's next request.
    #[instrument(skip(self))]
    pub async fn set_enabled(&self, id: i64, enabled: bool) -> Result<User> {
        let user = self.repo.set_enabled(id, enabled).await?;
        if enabled {
            info!(user_id = id, "Activated user");
        } else {
            warn!(user_id = id, "Deactivated user");
        }
        Ok(user)
    }

    /// Replace a user's role set.
    #[instrument(skip(self))]
    pub async fn set_roles(&self, id: i64, roles: RoleSet) -> Result<User> {
        if roles.is_empty() {
            bail!("Role set must be non-empty.");
        }

        let user = self.repo.set_roles(id, &roles).await?;
        info!(user_id = id, role = %user.role, "Updated user roles");
        Ok(user)
    }
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::db::Database;

    async fn service() -> UserService {
        let db = Database::in_memory().await.unwrap();
        UserService::new(UserRepository::new(db.pool().clone()), PasswordHasher::new(4))
    }

    fn request(email: &str, password: &str, roles: &[Role]) -> CreateUserRequest {
        CreateUserRequest {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: RoleSet::from(roles),
        }
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name@sub.domain.com"));
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("a@b@example.com"));
        assert!(!is_valid_email("us er@example.com"));
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let service = service().await;
        let user = service
            .create_user(request("new@example.com", "secret1", &[Role::Curator]))
            .await
            .unwrap();

        assert_ne!(user.password_hash, "secret1");
        assert!(PasswordHasher::new(4).verify("secret1", &user.password_hash));
        assert_eq!(user.role, RoleSet::from([Role::Curator]));
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let service = service().await;

        let err = service
            .create_user(request("not-an-email", "secret1", &[Role::Client]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid email"));

        let err = service
            .create_user(request("a@example.com", "12345", &[Role::Client]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be at least 6"));

        let err = service
            .create_user(request("a@example.com", "secret1", &[]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be non-empty"));

        let err = service
            .create_user(request("a@example.com", &"p".repeat(73), &[Role::Client]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("at most 72 bytes"));
    }

    fn update(email: &str, password: &str, roles: &[Role]) -> UpdateUserRequest {
        UpdateUserRequest {
            name: "Updated".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: RoleSet::from(roles),
        }
    }

    #[tokio::test]
    async fn test_update_user_rehashes_password() {
        let service = service().await;
        let user = service
            .create_user(request("u@example.com", "secret1", &[Role::Client]))
            .await
            .unwrap();

        // Keeping the same email is allowed.
        let updated = service
            .update_user(user.id, update("u@example.com", "rotated9", &[Role::Curator]))
            .await
            .unwrap();

        let hasher = PasswordHasher::new(4);
        assert_eq!(updated.name, "Updated");
        assert_eq!(updated.role, RoleSet::from([Role::Curator]));
        assert!(hasher.verify("rotated9", &updated.password_hash));
        assert!(!hasher.verify("secret1", &updated.password_hash));
    }

    #[tokio::test]
    async fn test_update_user_validation() {
        let service = service().await;
        service
            .create_user(request("other@example.com", "secret1", &[Role::Client]))
            .await
            .unwrap();
        let user = service
            .create_user(request("me@example.com", "secret1", &[Role::Client]))
            .await
            .unwrap();

        let err = service
            .update_user(user.id, update("other@example.com", "secret1", &[Role::Client]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));

        let err = service
            .update_user(user.id, update("me@example.com", "123", &[Role::Client]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be at least 6"));

        let err = service
            .update_user(user.id, update("me@example.com", "secret1", &[]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be non-empty"));

        let err = service
            .update_user(4242, update("new@example.com", "secret1", &[Role::Client]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let service = service().await;
        service
            .create_user(request("taken@example.com", "secret1", &[Role::Client]))
            .await
            .unwrap();

        let err = service
            .create_user(request("taken@example.com", "secret2", &[Role::Admin]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[tokio::test]
    async fn test_set_roles_rejects_empty() {
        let service = service().await;
        let user = service
            .create_user(request("r@example.com", "secret1", &[Role::Client]))
            .await
            .unwrap();

        assert!(service.set_roles(user.id, RoleSet::new()).await.is_err());
        let updated = service
            .set_roles(user.id, RoleSet::from([Role::Admin, Role::Client]))
            .await
            .unwrap();
        assert!(updated.role.contains(Role::Admin));
    }
}
