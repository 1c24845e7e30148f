//! Role-based permission evaluation.

use super::{AuthError, CurrentUser, Role, RoleSet};

/// Roles an operation accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Required {
    /// The user must hold exactly this role.
    Role(Role),
    /// The user must hold at least one of these roles. An empty set admits nobody.
    AnyOf(RoleSet),
}


impl From<Role> for Required {
    fn from(role: Role) -> Self {
        Required::Role(role)
    }
}

impl From<RoleSet> for Required {
    fn from(roles: RoleSet) -> Self {
        Required::AnyOf(roles)
    }
}

impl From<&[Role]> for Required {
    fn from(roles: &[Role]) -> Self {
        Required::AnyOf(RoleSet::from(roles))
    }
}

impl<const N: usize> From<[Role; N]> for Required {
    fn from(roles: [Role; N]) -> Self {
        Required::AnyOf(RoleSet::from(roles))
    }
}

impl std::fmt::Display for Required {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Required::Role(role) => write!(f, "{role} role required"),
            Required::AnyOf(roles) => write!(f, "one of {roles} required"),
        }
    }
}

/// Decide whether `user` satisfies `required`.
///
/// Pure function of its inputs; the bypass switch is handled by the caller
/// (see `AuthState::authorize`).
pub fn check(user: &CurrentUser, required: &Required) -> Result<(), AuthError> {
    let granted = match required {
        Required::Role(role) => user.role.contains(*role),
        Required::AnyOf(roles) => user.role.intersects(roles),
    };

    if granted {
        Ok(())
    } else {
        Err(AuthError::forbidden(required.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(roles: &[Role]) -> CurrentUser {
        CurrentUser {
            id: 1,
            email: "teste@teste.com".to_string(),
            name: "Test user".to_string(),
            role: RoleSet::from(roles),
            enabled: true,
        }
    }

    #[test]
    fn test_any_of_is_logical_or() {
        let admin = user_with(&[Role::Admin]);
        assert!(check(&admin, &Required::from([Role::Curator, Role::Client])).is_err());
        assert!(check(&admin, &Required::from([Role::Admin, Role::Curator])).is_ok());

        // The first element of the list is not special.
        let client = user_with(&[Role::Client]);
        assert!(check(&client, &Required::from([Role::Admin, Role::Client])).is_ok());
        assert!(check(&client, &Required::from([Role::Client, Role::Admin])).is_ok());
    }

    #[test]
    fn test_permission_matrix() {
        let cases = [
            (vec![Role::Client], vec![Role::Admin], false),
            (
                vec![Role::Admin],
                vec![Role::Admin, Role::Curator, Role::Client],
                true,
            ),
            (vec![Role::Curator], vec![Role::Admin, Role::Client], false),
            (vec![Role::Curator, Role::Client], vec![Role::Admin, Role::Curator], true),
            (vec![], vec![Role::Admin, Role::Curator, Role::Client], false),
        ];

        for (held, required, expected) in cases {
            let user = user_with(&held);
            let result = check(&user, &Required::from(required.as_slice()));
            assert_eq!(result.is_ok(), expected, "held {held:?}, required {required:?}");
        }
    }

    #[test]
    fn test_empty_requirement_denies_everyone() {
        let everything = user_with(&Role::ALL);
        let result = check(&everything, &Required::AnyOf(RoleSet::new()));
        assert!(matches!(result, Err(AuthError::InsufficientPermissions(_))));
    }

    #[test]
    fn test_single_role() {
        let curator = user_with(&[Role::Curator, Role::Client]);
        assert!(check(&curator, &Required::Role(Role::Curator)).is_ok());
        assert!(check(&curator, &Required::Role(Role::Admin)).is_err());
    }

    #[test]
    fn test_every_role_set() {
        let every = Required::AnyOf(RoleSet::from(Role::ALL));
        assert!(check(&user_with(&[Role::Client]), &every).is_ok());
        assert!(check(&user_with(&[]), &every).is_err());
    }
}
