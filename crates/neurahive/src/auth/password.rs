//! Password hashing (bcrypt).

use super::AuthError;

/// bcrypt only keys on the first 72 bytes; longer input is refused rather
/// than silently cut.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted, adaptive one-way password hashing.
///
/// The salt and cost live inside the hash string, so verification needs
/// nothing but the stored hash.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password of at most [`MAX_PASSWORD_BYTES`].
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        bcrypt::non_truncating_hash(plaintext, self.cost)
            .map_err(|e| AuthError::internal(format!("failed to hash password: {e}")))
    }

    /// Check a plaintext password against a stored hash.
    /// A malformed hash or an over-long password never matches.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        bcrypt::non_truncating_verify(plaintext, hash).unwrap_or(false)
    }

    /// [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_async(&self, plaintext: String) -> Result<String, AuthError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::internal(format!("password hashing task failed: {e}")))?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_async(&self, plaintext: String, hash: String) -> bool {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash))
            .await
            .unwrap_or(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
