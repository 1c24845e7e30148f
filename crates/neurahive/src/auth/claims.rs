//! JWT claims and the per-request identity snapshot.

use serde::{Deserialize, Serialize};

use super::{Role, RoleSet};
use crate::user::User;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID, decimal string).
    pub sub: String,

    /// Roles held when the token was issued.
    ///
    /// Informational only: authorization always uses the roles re-read from
    /// the credential store.
    #[serde(default)]
    pub roles: RoleSet,

    /// Issued at (as Unix timestamp).
    pub iat: i64,

    /// Expiration time (as Unix timestamp).
    pub exp: i64,

    /// JWT ID.
    pub jti: String,
}

impl Claims {
    /// Parse the subject claim into a user id.
    pub fn subject_id(&self) -> Option<i64> {
        self.sub.trim().parse::<i64>().ok().filter(|id| *id > 0)
    }
}

/// Authenticated user, rebuilt from the credential store on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: RoleSet,
    pub enabled: bool,
}

impl CurrentUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.role.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            enabled: user.enabled,
        }
    }
}

/// Outcome of token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// A verified, enabled user.
    User(CurrentUser),
    /// Authentication is disabled for this deployment. Carries no user and
    /// must only be used to skip authorization.
    Bypass,
}

impl Identity {
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            Identity::User(user) => Some(user),
            Identity::Bypass => None,
        }
    }

    pub fn is_bypass(&self) -> bool {
        matches!(self, Identity::Bypass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with_sub(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            roles: RoleSet::new(),
            iat: 0,
            exp: 0,
            jti: "test".to_string(),
        }
    }

    #[test]
    fn test_subject_id_parsing() {
        assert_eq!(claims_with_sub("42").subject_id(), Some(42));
        assert_eq!(claims_with_sub(" 7 ").subject_id(), Some(7));
        assert_eq!(claims_with_sub("").subject_id(), None);
        assert_eq!(claims_with_sub("abc").subject_id(), None);
        assert_eq!(claims_with_sub("0").subject_id(), None);
        assert_eq!(claims_with_sub("-3").subject_id(), None);
    }

    #[test]
    fn test_identity_accessors() {
        let user = CurrentUser {
            id: 1,
            email: "admin@example.com".to_string(),
            name: "Admin".to_string(),
            role: RoleSet::from([Role::Admin]),
            enabled: true,
        };
        let identity = Identity::User(user.clone());
        assert_eq!(identity.user(), Some(&user));
        assert!(!identity.is_bypass());
        assert!(user.is_admin());

        assert!(Identity::Bypass.user().is_none());
        assert!(Identity::Bypass.is_bypass());
    }
}
