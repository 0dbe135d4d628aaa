//! Account roles.

use serde::{Deserialize, Serialize};

/// Permission tier of an account.
///
/// Stored in the `user_role` `PostgreSQL` enum and carried in access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "user_role"))]
pub enum Role {
    /// Manages users and stores, sees platform statistics.
    Admin,
    /// Browses stores and submits ratings.
    #[default]
    User,
    /// Owns stores and sees the ratings they received.
    Owner,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::User, Self::Owner];

    /// The canonical name, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "User",
            Self::Owner => "Owner",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0} (expected Admin, User or Owner)")]
pub struct ParseRoleError(pub String);

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    /// Parses a role name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseRoleError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_ignores_case() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("OWNER".parse::<Role>().unwrap(), Role::Owner);
        assert_eq!(" User ".parse::<Role>().unwrap(), Role::User);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_display_roundtrips() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        assert_eq!(serde_json::to_string(&Role::Owner).unwrap(), "\"Owner\"");
        let role: Role = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_default_is_user() {
        assert_eq!(Role::default(), Role::User);
    }
}
