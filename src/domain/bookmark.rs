//! Bookmark Entity
//!
//! A saved URL owned by one user. The tag list is not stored on the bookmark
//! row; it is derived by joining through the bookmark_tags link table.

use serde::{Deserialize, Serialize};
use super::entity::Entity;
use super::profile::UserId;

/// A bookmarked URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Unique identifier
    pub id: u32,
    /// Owning user
    pub user_id: UserId,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    /// Visible outside the owner's account
    pub is_public: bool,
    /// Owner id recorded when the bookmark was shared
    pub shared_by: Option<String>,
    /// Recipient address the bookmark was shared with
    pub shared_with: Option<String>,
    /// Creation time (UTC epoch millis)
    pub created_at: i64,
    /// Last modification time (UTC epoch millis)
    pub updated_at: i64,
}

impl Bookmark {
    pub fn new(id: u32, user_id: UserId, url: String, title: String) -> Self {
        Self {
            id,
            user_id,
            url,
            title,
            description: None,
            is_public: false,
            shared_by: None,
            shared_with: None,
            created_at: 0,
            updated_at: 0,
        }
    }
}

impl Entity for Bookmark {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Input for creating a bookmark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookmark {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    /// Desired tag names; `None` means no tags
    pub tags: Option<Vec<String>>,
}

/// Partial update of a bookmark
///
/// `tags: None` means the tag set was not provided and existing links stay
/// untouched; `tags: Some(vec![])` means "remove all tags".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkPatch {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// Materialized view of a bookmark with its resolved tag names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkWithTags {
    #[serde(flatten)]
    pub bookmark: Bookmark,
    /// Tag names in link-insertion order
    pub tags: Vec<String>,
}
