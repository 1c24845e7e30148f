//! Authentication middleware and extractors.

use std::marker::PhantomData;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    AuthConfig, AuthError, ConfigValidationError, CredentialStore, Identity, PasswordHasher,
    Required, Role, RoleSet, TokenDecoder, TokenIssuer, TokenVerifier, check,
};

/// Whether requests are authenticated at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Enforced,
    /// Every request is admitted without a user identity.
    Bypass,
}

impl AuthMode {
    pub fn is_bypass(self) -> bool {
        self == AuthMode::Bypass
    }
}

/// Token returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Authentication state shared across handlers.
#[derive(Clone)]
pub struct AuthState {
    mode: AuthMode,
    hasher: PasswordHasher,
    issuer: Option<Arc<TokenIssuer>>,
    verifier: TokenVerifier,
    store: Arc<dyn CredentialStore>,
    /// Hash of a random password at the configured cost; logins for unknown
    /// emails are verified against it.
    dummy_hash: Arc<str>,
}

impl AuthState {
    /// Create auth state from a validated config.
    /// Resolves `env:VAR_NAME` syntax in secret_key at construction time.
    pub fn new(
        config: &AuthConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, ConfigValidationError> {
        config.validate()?;

        let mode = if config.no_auth {
            warn!("authentication is DISABLED (auth.no_auth = true); every request is admitted");
            AuthMode::Bypass
        } else {
            AuthMode::Enforced
        };

        let algorithm = config.signing_algorithm()?;
        let secret = config.resolve_secret_key()?;

        let issuer = secret
            .as_deref()
            .map(|s| Arc::new(TokenIssuer::new(s, algorithm, config.access_token_ttl())));
        let decoder = secret.as_deref().map(|s| TokenDecoder::new(s, algorithm));

        let hasher = PasswordHasher::new(config.password_hash_cost);
        let dummy_hash = hasher
            .hash(&uuid::Uuid::new_v4().to_string())
            .unwrap_or_default();

        Ok(Self {
            mode,
            hasher,
            issuer,
            verifier: TokenVerifier::new(mode, decoder, store.clone()),
            store,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Check if authentication is bypassed.
    pub fn is_bypass(&self) -> bool {
        self.mode.is_bypass()
    }

    pub fn hasher(&self) -> PasswordHasher {
        self.hasher
    }

    fn issuer(&self) -> Result<&TokenIssuer, AuthError> {
        self.issuer
            .as_deref()
            .ok_or_else(|| AuthError::internal("token signing not configured"))
    }

    /// Verify the `Authorization` header of a request.
    pub async fn verify(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
        self.verifier.verify(authorization).await
    }

    /// Check that `identity` holds one of the required roles.
    ///
    /// Always succeeds in bypass mode. A bypass identity presented while
    /// authentication is enforced is refused.
    pub fn authorize(
        &self,
        identity: &Identity,
        required: impl Into<Required>,
    ) -> Result<(), AuthError> {
        if self.is_bypass() {
            return Ok(());
        }

        match identity {
            Identity::User(user) => check(user, &required.into()),
            Identity::Bypass => Err(AuthError::forbidden(
                "bypass identity outside bypass mode",
            )),
        }
    }

    /// Exchange email and password for an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, AuthError> {
        let issuer = self.issuer()?;

        let user = self
            .store
            .find_user_by_email(email.trim())
            .await
            .map_err(|e| AuthError::internal(format!("credential store lookup failed: {e:#}")))?;

        let Some(user) = user else {
            debug!("login attempt for unknown email");
            self.hasher
                .verify_async(password.to_string(), self.dummy_hash.to_string())
                .await;
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify_async(password.to_string(), user.password_hash.clone())
            .await
        {
            warn!(user_id = user.id, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.enabled {
            warn!(user_id = user.id, "login refused for disabled user");
            return Err(AuthError::InvalidCredentials);
        }

        if let Err(e) = self.store.record_login(user.id).await {
            warn!(user_id = user.id, "failed to record login: {e:#}");
        }

        let token = issuer.issue(user.id, &user.role, None)?;
        info!(user_id = user.id, "user logged in");
        Ok(TokenResponse::bearer(token))
    }

    /// Issue a new token for an already verified identity.
    pub fn refresh(&self, identity: &Identity) -> Result<TokenResponse, AuthError> {
        let issuer = self.issuer()?;
        let user = identity.user().ok_or(AuthError::UserNotFound)?;
        let token = issuer.issue(user.id, &user.role, None)?;
        debug!(user_id = user.id, "refreshed access token");
        Ok(TokenResponse::bearer(token))
    }

    /// Issue a token for `subject_id` with explicit roles.
    pub fn issue_token(&self, subject_id: i64, roles: &RoleSet) -> Result<String, AuthError> {
        self.issuer()?.issue(subject_id, roles, None)
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("mode", &self.mode)
            .field("hasher", &self.hasher)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

/// Authentication middleware.
///
/// Verifies the `Authorization` header and injects the resulting
/// [`Identity`] into request extensions. In bypass mode the header is not
/// looked at.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = if auth.is_bypass() {
        Identity::Bypass
    } else {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .map(|h| h.to_str().map_err(|_| AuthError::InvalidAuthHeader))
            .transpose()?;
        auth.verify(header).await?
    };

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Verified identity of the caller, any role.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(Authenticated)
            .ok_or(AuthError::MissingAuthHeader)
    }
}

/// Roles a route accepts, chosen at compile time.
pub trait RolePolicy: Send + Sync + 'static {
    fn required() -> Required;
}

/// `ADMIN` only.
#[derive(Debug, Clone, Copy)]
pub struct AdminOnly;

impl RolePolicy for AdminOnly {
    fn required() -> Required {
        Required::Role(Role::Admin)
    }
}

/// Require the caller to satisfy policy `P`.
///
/// Use as an extractor in handlers behind [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct RequireRoles<P: RolePolicy>(pub Identity, PhantomData<P>);

impl<P: RolePolicy> RequireRoles<P> {
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

/// Require admin role.
pub type RequireAdmin = RequireRoles<AdminOnly>;

impl<S, P> FromRequestParts<S> for RequireRoles<P>
where
    S: Send + Sync,
    P: RolePolicy,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)?;

        let auth = AuthState::from_ref(state);
        auth.authorize(&identity, P::required())?;

        Ok(RequireRoles(identity, PhantomData))
    }
}
