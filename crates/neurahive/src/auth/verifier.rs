//! Token verification against the credential store.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{AuthError, AuthMode, CredentialStore, CurrentUser, Identity, TokenDecoder};

/// Extract the token from an `Authorization` header value.
///
/// Accepts `<token>` or `<scheme> <token>`; the scheme itself is not
/// interpreted.
pub fn token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let trimmed = header_value.trim();
    let token = match trimmed.split_once(char::is_whitespace) {
        Some((_scheme, rest)) => rest.trim_start(),
        None => trimmed,
    };

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Resolves a presented token to a fresh user snapshot.
#[derive(Clone)]
pub struct TokenVerifier {
    mode: AuthMode,
    decoder: Option<TokenDecoder>,
    store: Arc<dyn CredentialStore>,
}

impl TokenVerifier {
    pub fn new(
        mode: AuthMode,
        decoder: Option<TokenDecoder>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            mode,
            decoder,
            store,
        }
    }

    /// Verify the raw `Authorization` header of a request.
    pub async fn verify(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
        if self.mode.is_bypass() {
            return Ok(Identity::Bypass);
        }

        let header = authorization.ok_or(AuthError::MissingAuthHeader)?;
        let token = token_from_header(header)?;

        let decoder = self
            .decoder
            .as_ref()
            .ok_or_else(|| AuthError::internal("no signing secret configured"))?;
        let claims = decoder.decode(token)?;

        let subject_id = claims.subject_id().ok_or_else(|| {
            warn!(sub = %claims.sub, "token subject is not a user id");
            AuthError::InvalidSubject
        })?;

        let user = self.resolve(subject_id).await?;
        Ok(Identity::User(user))
    }

    /// Read the subject from the store. Runs on every request so that
    /// deactivation and role changes apply immediately.
    pub async fn resolve(&self, subject_id: i64) -> Result<CurrentUser, AuthError> {
        let user = self
            .store
            .find_user_by_id(subject_id)
            .await
            .map_err(|e| AuthError::internal(format!("credential store lookup failed: {e:#}")))?
            .ok_or_else(|| {
                debug!(user_id = subject_id, "token subject not found");
                AuthError::UserNotFound
            })?;

        if !user.enabled {
            warn!(user_id = subject_id, "rejected token for disabled user");
            return Err(AuthError::UserDisabled);
        }

        Ok(CurrentUser::from(user))
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("mode", &self.mode)
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}
