//! Authentication configuration.

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

/// Shortest accepted access token lifetime, in minutes.
pub const MIN_TOKEN_TTL_MINUTES: i64 = 1;
/// Longest accepted access token lifetime, in minutes (one day).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 24 * 60;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Disable authentication and authorization entirely.
    /// Read once at startup; meant for trusted internal deployments only.
    pub no_auth: bool,

    /// HMAC secret used to sign access tokens. Supports `env:VAR_NAME`.
    /// REQUIRED when no_auth is false.
    pub secret_key: Option<String>,

    /// Signing algorithm name (HS256, HS384 or HS512).
    pub algorithm: String,

    /// Access token lifetime in minutes.
    pub access_token_ttl_minutes: i64,

    /// bcrypt cost factor for password hashes.
    pub password_hash_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            no_auth: false,
            // No default secret - must be explicitly configured
            secret_key: None,
            algorithm: "HS256".to_string(),
            access_token_ttl_minutes: 30,
            password_hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AuthConfig {
    /// Resolve the signing secret, expanding `env:VAR_NAME` syntax.
    /// Returns the resolved secret or None if not configured.
    pub fn resolve_secret_key(&self) -> Result<Option<String>, ConfigValidationError> {
        match &self.secret_key {
            None => Ok(None),
            Some(value) => {
                if let Some(var_name) = value.strip_prefix("env:") {
                    match std::env::var(var_name) {
                        Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                        Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                        Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
                    }
                } else {
                    Ok(Some(value.clone()))
                }
            }
        }
    }

    /// Parse the configured algorithm. Only the HMAC family is accepted
    /// since tokens are signed with a shared secret.
    pub fn signing_algorithm(&self) -> Result<Algorithm, ConfigValidationError> {
        let algorithm: Algorithm = self
            .algorithm
            .trim()
            .to_uppercase()
            .parse()
            .map_err(|_| ConfigValidationError::UnsupportedAlgorithm(self.algorithm.clone()))?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
            _ => Err(ConfigValidationError::UnsupportedAlgorithm(
                self.algorithm.clone(),
            )),
        }
    }

    /// Default access token lifetime.
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_token_ttl_minutes)
    }

    /// Validate the configuration.
    /// Returns an error if the configuration is invalid for the current mode.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.signing_algorithm()?;

        if !(MIN_TOKEN_TTL_MINUTES..=MAX_TOKEN_TTL_MINUTES).contains(&self.access_token_ttl_minutes)
        {
            return Err(ConfigValidationError::TokenTtlOutOfRange(
                self.access_token_ttl_minutes,
            ));
        }

        if !(4..=31).contains(&self.password_hash_cost) {
            return Err(ConfigValidationError::InvalidHashCost(
                self.password_hash_cost,
            ));
        }

        let secret = self.resolve_secret_key()?;
        match secret {
            None if !self.no_auth => return Err(ConfigValidationError::MissingSecretKey),
            None => {}
            Some(ref secret) => {
                if secret == "change-me" {
                    return Err(ConfigValidationError::InsecureSecretKey);
                }
                // HMAC keys shorter than the digest weaken the signature
                if secret.len() < 32 {
                    return Err(ConfigValidationError::SecretKeyTooShort);
                }
            }
        }

        Ok(())
    }

    /// Generate a secure random signing secret using cryptographically secure RNG.
    pub fn generate_secret_key() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Secret key is required unless authentication is disabled.
    MissingSecretKey,
    /// Secret key is the placeholder value.
    InsecureSecretKey,
    /// Secret key is too short (minimum 32 characters).
    SecretKeyTooShort,
    /// Algorithm is unknown or not an HMAC algorithm.
    UnsupportedAlgorithm(String),
    /// Token lifetime outside the accepted range.
    TokenTtlOutOfRange(i64),
    /// bcrypt cost outside 4..=31.
    InvalidHashCost(u32),
    /// Environment variable not found (for `env:VAR_NAME` syntax).
    EnvVarNotFound(String),
    /// Environment variable is empty (for `env:VAR_NAME` syntax).
    EnvVarEmpty(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSecretKey => {
                write!(
                    f,
                    "auth.secret_key is required when auth.no_auth is false. Set NEURAHIVE__AUTH__SECRET_KEY or secret_key in config."
                )
            }
            Self::InsecureSecretKey => {
                write!(
                    f,
                    "auth.secret_key cannot be the placeholder value. Run `neurahive generate-secret`."
                )
            }
            Self::SecretKeyTooShort => {
                write!(f, "auth.secret_key must be at least 32 characters long.")
            }
            Self::UnsupportedAlgorithm(alg) => {
                write!(
                    f,
                    "unsupported signing algorithm '{}' (expected HS256, HS384 or HS512).",
                    alg
                )
            }
            Self::TokenTtlOutOfRange(minutes) => {
                write!(
                    f,
                    "auth.access_token_ttl_minutes must be between {} and {} (got {}).",
                    MIN_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES, minutes
                )
            }
            Self::InvalidHashCost(cost) => {
                write!(
                    f,
                    "auth.password_hash_cost must be between 4 and 31 (got {}).",
                    cost
                )
            }
            Self::EnvVarNotFound(var) => {
                write!(
                    f,
                    "Environment variable '{}' not found (referenced via env:{} in config).",
                    var, var
                )
            }
            Self::EnvVarEmpty(var) => {
                write!(
                    f,
                    "Environment variable '{}' is empty (referenced via env:{} in config).",
                    var, var
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}
