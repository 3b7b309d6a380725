//! Tag Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for Tag CRUD, plus the name-based lookup and
//! batch upsert the tag synchronizer is built on. Link-table operations live
//! in bookmark_tag.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{DomainError, DomainResult, Tag, UserId};
use super::db::DbHandle;
use super::traits::OwnedRepository;

/// SQLite implementation of Tag repository
pub struct TagRepository {
    pub(super) conn: DbHandle,
}

impl TagRepository {
    pub fn new(conn: DbHandle) -> Self {
        Self { conn }
    }

    /// Find the owner's tags carrying any of `names` (exact match)
    pub async fn find_by_names(&self, owner: &UserId, names: &[String]) -> DomainResult<Vec<Tag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock().await;

        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "SELECT id, user_id, name, created_at FROM tags WHERE user_id = ? AND name IN ({})",
            placeholders
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut bound: Vec<&dyn rusqlite::ToSql> = Vec::with_capacity(names.len() + 1);
        let owner_id = owner.as_str();
        bound.push(&owner_id);
        for name in names {
            bound.push(name);
        }

        let mut rows = stmt
            .query(bound.as_slice())
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut tags = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            tags.push(row_to_tag(row)?);
        }
        Ok(tags)
    }

    /// Ensure a tag row exists for every name, owned by `owner`
    ///
    /// One batch insert with ON CONFLICT(user_id, name) DO NOTHING, then a
    /// re-resolve by name. A name that collides with an existing row (or
    /// with a concurrent writer's row) resolves to that row instead of
    /// erroring, so the whole call is idempotent and safe to retry.
    pub async fn upsert_names(&self, owner: &UserId, names: &[String]) -> DomainResult<Vec<Tag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        {
            let mut conn = self.conn.lock().await;
            let now = chrono::Utc::now().timestamp_millis();

            let tx = conn
                .transaction()
                .map_err(|e| DomainError::Store(e.to_string()))?;
            {
                let mut stmt = tx
                    .prepare(
                        "INSERT INTO tags (user_id, name, created_at) VALUES (?, ?, ?)
                         ON CONFLICT(user_id, name) DO NOTHING",
                    )
                    .map_err(|e| DomainError::Store(e.to_string()))?;

                for name in names {
                    stmt.execute(params![owner.as_str(), name.clone(), now])
                        .map_err(|e| DomainError::Store(e.to_string()))?;
                }
            }
            tx.commit().map_err(|e| DomainError::Store(e.to_string()))?;
        }

        self.find_by_names(owner, names).await
    }
}

#[async_trait]
impl OwnedRepository<Tag> for TagRepository {
    async fn create(&self, owner: &UserId, entity: &Tag) -> DomainResult<Tag> {
        let conn = self.conn.lock().await;
        let now = chrono::Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO tags (user_id, name, created_at) VALUES (?, ?, ?)",
            params![owner.as_str(), entity.name.clone(), now],
        )
        .map_err(|e| DomainError::Store(e.to_string()))?;

        let id = conn.last_insert_rowid() as u32;

        let mut tag = entity.clone();
        tag.id = id;
        tag.user_id = owner.clone();
        tag.created_at = now;
        Ok(tag)
    }

    async fn find_by_id(&self, owner: &UserId, id: u32) -> DomainResult<Option<Tag>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare("SELECT id, user_id, name, created_at FROM tags WHERE id = ? AND user_id = ?")
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut rows = stmt
            .query(params![id, owner.as_str()])
            .map_err(|e| DomainError::Store(e.to_string()))?;

        if let Some(row) = rows
            .next()
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            Ok(Some(row_to_tag(row)?))
        } else {
            Ok(None)
        }
    }

    async fn list(&self, owner: &UserId) -> DomainResult<Vec<Tag>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare("SELECT id, user_id, name, created_at FROM tags WHERE user_id = ? ORDER BY name")
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut rows = stmt
            .query(params![owner.as_str()])
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut tags = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            tags.push(row_to_tag(row)?);
        }
        Ok(tags)
    }

    async fn update(&self, owner: &UserId, entity: &Tag) -> DomainResult<Tag> {
        let conn = self.conn.lock().await;

        let affected = conn
            .execute(
                "UPDATE tags SET name = ? WHERE id = ? AND user_id = ?",
                params![entity.name.clone(), entity.id, owner.as_str()],
            )
            .map_err(|e| DomainError::Store(e.to_string()))?;

        if affected == 0 {
            return Err(DomainError::NotFound(format!("tag {}", entity.id)));
        }

        Ok(entity.clone())
    }

    async fn delete(&self, owner: &UserId, id: u32) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;

        // Remove the tag and any links pointing at it together
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let affected = tx
            .execute(
                "DELETE FROM tags WHERE id = ? AND user_id = ?",
                params![id, owner.as_str()],
            )
            .map_err(|e| DomainError::Store(e.to_string()))?;

        if affected == 0 {
            return Err(DomainError::NotFound(format!("tag {}", id)));
        }

        tx.execute("DELETE FROM bookmark_tags WHERE tag_id = ?", params![id])
            .map_err(|e| DomainError::Store(e.to_string()))?;

        tx.commit().map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(())
    }
}

/// Convert a database row to Tag
pub(super) fn row_to_tag(row: &rusqlite::Row) -> DomainResult<Tag> {
    Ok(Tag {
        id: row
            .get(0)
            .map_err(|e: rusqlite::Error| DomainError::Store(e.to_string()))?,
        user_id: UserId::new(
            row.get::<_, String>(1)
                .map_err(|e: rusqlite::Error| DomainError::Store(e.to_string()))?,
        ),
        name: row
            .get(2)
            .map_err(|e: rusqlite::Error| DomainError::Store(e.to_string()))?,
        created_at: row.get::<_, i64>(3).unwrap_or(0),
    })
}
