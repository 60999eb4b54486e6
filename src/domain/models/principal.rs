//! Authenticated principal model.
//!
//! Identity issuance and verification live outside this crate; the
//! `IdentityProvider` port hands us a resolved principal with its role set
//! and raw quota blob.

use serde::{Deserialize, Serialize};

/// Role attached to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

/// An authenticated identity plus its role set and quota overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque identity string, unique per principal
    pub id: String,
    /// Display name
    pub username: String,
    /// Role set
    pub roles: Vec<Role>,
    /// Raw per-user quota overrides as a JSON object string.
    /// Malformed content silently falls back to system defaults.
    pub quota: Option<String>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin() {
        let admin = Principal {
            id: "a1".into(),
            username: "root".into(),
            roles: vec![Role::User, Role::Admin],
            quota: None,
        };
        assert!(admin.is_admin());

        let user = Principal {
            id: "u1".into(),
            username: "alice".into(),
            roles: vec![Role::User],
            quota: None,
        };
        assert!(!user.is_admin());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from_str("Admin"), Some(Role::Admin));
        assert_eq!(Role::from_str(" user "), Some(Role::User));
        assert_eq!(Role::from_str("operator"), None);
    }
}
