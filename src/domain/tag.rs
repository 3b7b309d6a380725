//! Tag Entity
//!
//! Tags are owned per user and unique by (owner, name). They are created
//! lazily the first time a name is used and are never removed automatically
//! when their last link disappears.

use serde::{Deserialize, Serialize};
use super::entity::Entity;
use super::profile::UserId;

/// A tag for categorizing bookmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: u32,
    /// Owning user
    pub user_id: UserId,
    /// Tag name, unique per owner (case-sensitive)
    pub name: String,
    /// Creation time (UTC epoch millis)
    pub created_at: i64,
}

impl Tag {
    pub fn new(id: u32, user_id: UserId, name: String) -> Self {
        Self {
            id,
            user_id,
            name,
            created_at: 0,
        }
    }
}

impl Entity for Tag {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Join table entry for bookmark-tag relationship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkTag {
    pub bookmark_id: u32,
    pub tag_id: u32,
}
