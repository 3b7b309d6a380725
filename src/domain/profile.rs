//! User Identity and Profile
//!
//! Every bookmark and tag is owned by exactly one user; the owner id is the
//! opaque identifier handed out by the identity provider.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Opaque identifier of a user, as supplied by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Display profile attached to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique identifier
    pub id: u32,
    /// Owning user
    pub user_id: UserId,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Creation time (UTC epoch millis)
    pub created_at: i64,
}

impl UserProfile {
    pub fn new(id: u32, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            full_name: None,
            avatar_url: None,
            created_at: 0,
        }
    }
}

impl Entity for UserProfile {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_display() {
        let id = UserId::new("u-123");
        assert_eq!(id.to_string(), "u-123");
        assert_eq!(id.as_str(), "u-123");
    }
}
