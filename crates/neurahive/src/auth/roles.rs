//! Privilege tiers and role sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// User role.
///
/// Roles travel as small integers everywhere: in JSON bodies, in the
/// `users.role` column and in token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    /// Full access, including user management.
    Admin = 1,
    /// Maintains agents and knowledge bases.
    Curator = 2,
    /// Talks to agents.
    Client = 3,
}

impl Role {
    /// Every role the system knows about.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Curator, Role::Client];

    /// Numeric value used on the wire and in storage.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role.as_u8()
    }
}

impl TryFrom<u8> for Role {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::Admin),
            2 => Ok(Role::Curator),
            3 => Ok(Role::Client),
            _ => Err(format!("unknown role: {}", value)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Curator => write!(f, "curator"),
            Role::Client => write!(f, "client"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    /// Accepts either the role name or its numeric value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "1" => Ok(Role::Admin),
            "curator" | "2" => Ok(Role::Curator),
            "client" | "3" => Ok(Role::Client),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

/// Set of roles held by a user or accepted by an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// True when at least one role is present in both sets.
    pub fn intersects(&self, other: &RoleSet) -> bool {
        self.0.iter().any(|role| other.0.contains(role))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// JSON array form stored in the `users.role` column, e.g. `[1,3]`.
    pub fn to_json(&self) -> String {
        let values: Vec<u8> = self.iter().map(Role::as_u8).collect();
        serde_json::to_string(&values).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| format!("invalid role set {raw:?}: {e}"))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}

impl From<&[Role]> for RoleSet {
    fn from(roles: &[Role]) -> Self {
        roles.iter().copied().collect()
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.iter().map(|r| r.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

impl sqlx::Type<sqlx::Sqlite> for RoleSet {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for RoleSet {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Sqlite>>::encode(self.to_json(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for RoleSet {
    fn decode(
        value: <sqlx::Sqlite as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        RoleSet::from_json(&raw).map_err(|e: String| e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_values() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Role::Client).unwrap(), "3");
        let curator: Role = serde_json::from_str("2").unwrap();
        assert_eq!(curator, Role::Curator);
        assert!(serde_json::from_str::<Role>("4").is_err());
        assert!(serde_json::from_str::<Role>("0").is_err());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("CURATOR".parse::<Role>().unwrap(), Role::Curator);
        assert_eq!("3".parse::<Role>().unwrap(), Role::Client);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_set_json_roundtrip_is_sorted_and_deduplicated() {
        let set: RoleSet = serde_json::from_str("[3, 1, 3]").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_json(), "[1,3]");
        assert_eq!(RoleSet::from_json("[1,3]").unwrap(), set);
    }

    #[test]
    fn test_role_set_rejects_unknown_values() {
        assert!(RoleSet::from_json("[1, 9]").is_err());
        assert!(RoleSet::from_json("admin").is_err());
    }

    #[test]
    fn test_role_set_intersects() {
        let user = RoleSet::from([Role::Curator, Role::Client]);
        assert!(user.intersects(&RoleSet::from([Role::Admin, Role::Client])));
        assert!(!user.intersects(&RoleSet::from([Role::Admin])));
        assert!(!user.intersects(&RoleSet::new()));
        assert!(!RoleSet::new().intersects(&user));
    }

    #[test]
    fn test_role_set_display() {
        let set = RoleSet::from([Role::Client, Role::Admin]);
        assert_eq!(set.to_string(), "[admin, client]");
    }
}
