//! Access token issuing and decoding.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use super::{AuthError, Claims, RoleSet};

/// Builds signed, expiring access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, algorithm: Algorithm, default_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            algorithm,
            default_ttl,
        }
    }

    /// Issue a token for `subject_id` carrying `roles`.
    ///
    /// `ttl` falls back to the configured default. Every token gets a fresh
    /// `jti`, so two tokens are never byte-identical.
    pub fn issue(
        &self,
        subject_id: i64,
        roles: &RoleSet,
        ttl: Option<Duration>,
    ) -> Result<String, AuthError> {
        if subject_id <= 0 {
            return Err(AuthError::internal(format!(
                "refusing to issue token for subject {subject_id}"
            )));
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::internal("token expiry overflows"))?;

        let claims = Claims {
            sub: subject_id.to_string(),
            roles: roles.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        debug!(
            subject = subject_id,
            ttl_secs = ttl.num_seconds(),
            "issuing access token"
        );

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::internal(format!("failed to sign token: {e}")))
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

/// Checks token signature and expiry.
#[derive(Clone)]
pub struct TokenDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenDecoder {
    pub fn new(secret: &str, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify signature and expiry, returning the claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                debug!("token validation failed: {:?}", e.kind());
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })?;

        // exp is exclusive: a token is only valid strictly before it.
        if token_data.claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for TokenDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDecoder")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}
