//! Authentication and role-based authorization.
//!
//! Provides:
//! - bcrypt password hashing
//! - signed, expiring access tokens with a fresh credential-store read on
//!   every verification
//! - role checks with ANY semantics
//! - a deployment-wide bypass switch (`auth.no_auth`)

mod claims;
mod config;
mod error;
mod middleware;
mod password;
mod permission;
mod roles;
mod store;
mod token;
mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use claims::{Claims, CurrentUser, Identity};
pub use config::{AuthConfig, ConfigValidationError, MAX_TOKEN_TTL_MINUTES, MIN_TOKEN_TTL_MINUTES};
pub use error::{AuthError, AuthErrorResponse, AuthFailure};
pub use middleware::{
    AdminOnly, AuthMode, AuthState, Authenticated, RequireAdmin, RequireRoles, RolePolicy,
    TokenResponse, auth_middleware,
};
pub use password::{MAX_PASSWORD_BYTES, PasswordHasher};
pub use permission::{Required, check};
pub use roles::{Role, RoleSet};
pub use store::CredentialStore;
pub use token::{TokenDecoder, TokenIssuer};
pub use verifier::{TokenVerifier, token_from_header};
