//! Bookmark-Tag Relationship Operations
//!
//! Operations for managing the many-to-many relationship between bookmarks
//! and tags. The link set is always replaced wholesale (wipe + re-insert)
//! inside one transaction, so a failed replace leaves the previous links in
//! place instead of an empty set.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{DomainError, DomainResult, Tag, UserId};

/// Trait for bookmark-tag relationship operations
#[async_trait]
pub trait BookmarkTagOperations {
    /// Replace the bookmark's link set with exactly `tag_ids`, atomically
    async fn replace_links(&self, bookmark_id: u32, tag_ids: &[u32]) -> DomainResult<()>;

    /// Remove every link for a bookmark
    async fn clear_links(&self, bookmark_id: u32) -> DomainResult<()>;

    /// Get all tags linked to a bookmark, in link-insertion order
    async fn tags_for_bookmark(&self, bookmark_id: u32) -> DomainResult<Vec<Tag>>;

    /// Get the owner's bookmark ids carrying a specific tag
    async fn bookmarks_with_tag(&self, owner: &UserId, tag_id: u32) -> DomainResult<Vec<u32>>;
}

#[async_trait]
impl BookmarkTagOperations for super::tag_repo::TagRepository {
    async fn replace_links(&self, bookmark_id: u32, tag_ids: &[u32]) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;

        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Store(e.to_string()))?;

        tx.execute(
            "DELETE FROM bookmark_tags WHERE bookmark_id = ?",
            params![bookmark_id],
        )
        .map_err(|e| DomainError::Store(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare("INSERT OR IGNORE INTO bookmark_tags (bookmark_id, tag_id) VALUES (?, ?)")
                .map_err(|e| DomainError::Store(e.to_string()))?;

            for tag_id in tag_ids {
                stmt.execute(params![bookmark_id, tag_id])
                    .map_err(|e| DomainError::Store(e.to_string()))?;
            }
        }

        tx.commit().map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(())
    }

    async fn clear_links(&self, bookmark_id: u32) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "DELETE FROM bookmark_tags WHERE bookmark_id = ?",
            params![bookmark_id],
        )
        .map_err(|e| DomainError::Store(e.to_string()))?;

        Ok(())
    }

    async fn tags_for_bookmark(&self, bookmark_id: u32) -> DomainResult<Vec<Tag>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare(
                "SELECT t.id, t.user_id, t.name, t.created_at FROM tags t
                 JOIN bookmark_tags bt ON t.id = bt.tag_id
                 WHERE bt.bookmark_id = ?
                 ORDER BY bt.rowid",
            )
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut rows = stmt
            .query(params![bookmark_id])
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut tags = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            tags.push(super::tag_repo::row_to_tag(row)?);
        }
        Ok(tags)
    }

    async fn bookmarks_with_tag(&self, owner: &UserId, tag_id: u32) -> DomainResult<Vec<u32>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare(
                "SELECT bt.bookmark_id FROM bookmark_tags bt
                 JOIN bookmarks b ON b.id = bt.bookmark_id
                 WHERE bt.tag_id = ? AND b.user_id = ?
                 ORDER BY b.created_at DESC, b.id DESC",
            )
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut rows = stmt
            .query(params![tag_id, owner.as_str()])
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut bookmark_ids = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            bookmark_ids.push(
                row.get::<_, u32>(0)
                    .map_err(|e| DomainError::Store(e.to_string()))?,
            );
        }
        Ok(bookmark_ids)
    }
}
