//! Bookmark Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for Bookmark CRUD. Every statement filters
//! on user_id so a bookmark owned by someone else is indistinguishable from
//! a missing one.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{Bookmark, DomainError, DomainResult, UserId};
use super::db::DbHandle;
use super::traits::OwnedRepository;

const BOOKMARK_COLUMNS: &str =
    "id, user_id, url, title, description, is_public, shared_by, shared_with, created_at, updated_at";

/// SQLite implementation of Bookmark repository
pub struct BookmarkRepository {
    conn: DbHandle,
}

impl BookmarkRepository {
    pub fn new(conn: DbHandle) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl OwnedRepository<Bookmark> for BookmarkRepository {
    async fn create(&self, owner: &UserId, entity: &Bookmark) -> DomainResult<Bookmark> {
        let conn = self.conn.lock().await;
        let now = chrono::Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO bookmarks (user_id, url, title, description, is_public, shared_by, shared_with, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                owner.as_str(),
                entity.url.clone(),
                entity.title.clone(),
                entity.description.clone(),
                entity.is_public,
                entity.shared_by.clone(),
                entity.shared_with.clone(),
                now,
                now
            ],
        )
        .map_err(|e| DomainError::Store(e.to_string()))?;

        let id = conn.last_insert_rowid() as u32;

        let mut bookmark = entity.clone();
        bookmark.id = id;
        bookmark.user_id = owner.clone();
        bookmark.created_at = now;
        bookmark.updated_at = now;
        Ok(bookmark)
    }

    async fn find_by_id(&self, owner: &UserId, id: u32) -> DomainResult<Option<Bookmark>> {
        let conn = self.conn.lock().await;

        let sql = format!(
            "SELECT {} FROM bookmarks WHERE id = ? AND user_id = ?",
            BOOKMARK_COLUMNS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut rows = stmt
            .query(params![id, owner.as_str()])
            .map_err(|e| DomainError::Store(e.to_string()))?;

        if let Some(row) = rows
            .next()
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            Ok(Some(row_to_bookmark(row)?))
        } else {
            Ok(None)
        }
    }

    async fn list(&self, owner: &UserId) -> DomainResult<Vec<Bookmark>> {
        let conn = self.conn.lock().await;

        // Newest first, like the bookmark listing screen expects
        let sql = format!(
            "SELECT {} FROM bookmarks WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            BOOKMARK_COLUMNS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut rows = stmt
            .query(params![owner.as_str()])
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut bookmarks = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            bookmarks.push(row_to_bookmark(row)?);
        }
        Ok(bookmarks)
    }

    async fn update(&self, owner: &UserId, entity: &Bookmark) -> DomainResult<Bookmark> {
        let conn = self.conn.lock().await;
        let now = chrono::Utc::now().timestamp_millis();

        let affected = conn
            .execute(
                "UPDATE bookmarks SET url = ?, title = ?, description = ?, is_public = ?,
                 shared_by = ?, shared_with = ?, updated_at = ?
                 WHERE id = ? AND user_id = ?",
                params![
                    entity.url.clone(),
                    entity.title.clone(),
                    entity.description.clone(),
                    entity.is_public,
                    entity.shared_by.clone(),
                    entity.shared_with.clone(),
                    now,
                    entity.id,
                    owner.as_str()
                ],
            )
            .map_err(|e| DomainError::Store(e.to_string()))?;

        if affected == 0 {
            return Err(DomainError::NotFound(format!("bookmark {}", entity.id)));
        }

        let mut bookmark = entity.clone();
        bookmark.updated_at = now;
        Ok(bookmark)
    }

    async fn delete(&self, owner: &UserId, id: u32) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;

        // Remove the bookmark and its tag links together; tag rows stay
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let affected = tx
            .execute(
                "DELETE FROM bookmarks WHERE id = ? AND user_id = ?",
                params![id, owner.as_str()],
            )
            .map_err(|e| DomainError::Store(e.to_string()))?;

        if affected == 0 {
            return Err(DomainError::NotFound(format!("bookmark {}", id)));
        }

        tx.execute(
            "DELETE FROM bookmark_tags WHERE bookmark_id = ?",
            params![id],
        )
        .map_err(|e| DomainError::Store(e.to_string()))?;

        tx.commit().map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(())
    }
}

/// Convert a database row to Bookmark
pub(super) fn row_to_bookmark(row: &rusqlite::Row) -> DomainResult<Bookmark> {
    Ok(Bookmark {
        id: row
            .get(0)
            .map_err(|e: rusqlite::Error| DomainError::Store(e.to_string()))?,
        user_id: UserId::new(
            row.get::<_, String>(1)
                .map_err(|e: rusqlite::Error| DomainError::Store(e.to_string()))?,
        ),
        url: row
            .get(2)
            .map_err(|e: rusqlite::Error| DomainError::Store(e.to_string()))?,
        title: row
            .get(3)
            .map_err(|e: rusqlite::Error| DomainError::Store(e.to_string()))?,
        description: row.get::<_, Option<String>>(4).unwrap_or(None),
        is_public: row.get::<_, bool>(5).unwrap_or(false),
        shared_by: row.get::<_, Option<String>>(6).unwrap_or(None),
        shared_with: row.get::<_, Option<String>>(7).unwrap_or(None),
        created_at: row.get::<_, i64>(8).unwrap_or(0),
        updated_at: row.get::<_, i64>(9).unwrap_or(0),
    })
}
