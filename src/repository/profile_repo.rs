//! Profile Repository
//!
//! Profiles are keyed by the identity provider's user id (one row per user),
//! so the generic owner-scoped CRUD trait does not fit; lookups go through
//! user_id directly.

use rusqlite::params;

use crate::domain::{DomainError, DomainResult, UserId, UserProfile};
use super::db::DbHandle;

/// SQLite implementation of Profile repository
pub struct ProfileRepository {
    conn: DbHandle,
}

impl ProfileRepository {
    pub fn new(conn: DbHandle) -> Self {
        Self { conn }
    }

    pub async fn create(&self, entity: &UserProfile) -> DomainResult<UserProfile> {
        let conn = self.conn.lock().await;
        let now = chrono::Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO profiles (user_id, full_name, avatar_url, created_at) VALUES (?, ?, ?, ?)",
            params![
                entity.user_id.as_str(),
                entity.full_name.clone(),
                entity.avatar_url.clone(),
                now
            ],
        )
        .map_err(|e| DomainError::Store(e.to_string()))?;

        let id = conn.last_insert_rowid() as u32;

        let mut profile = entity.clone();
        profile.id = id;
        profile.created_at = now;
        Ok(profile)
    }

    pub async fn find_by_user(&self, user_id: &UserId) -> DomainResult<Option<UserProfile>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, full_name, avatar_url, created_at FROM profiles WHERE user_id = ?",
            )
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut rows = stmt
            .query(params![user_id.as_str()])
            .map_err(|e| DomainError::Store(e.to_string()))?;

        if let Some(row) = rows
            .next()
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            Ok(Some(row_to_profile(row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn update(&self, entity: &UserProfile) -> DomainResult<UserProfile> {
        let conn = self.conn.lock().await;

        let affected = conn
            .execute(
                "UPDATE profiles SET full_name = ?, avatar_url = ? WHERE user_id = ?",
                params![
                    entity.full_name.clone(),
                    entity.avatar_url.clone(),
                    entity.user_id.as_str()
                ],
            )
            .map_err(|e| DomainError::Store(e.to_string()))?;

        if affected == 0 {
            return Err(DomainError::NotFound(format!(
                "profile for {}",
                entity.user_id
            )));
        }

        Ok(entity.clone())
    }
}

/// Convert a database row to UserProfile
fn row_to_profile(row: &rusqlite::Row) -> DomainResult<UserProfile> {
    Ok(UserProfile {
        id: row
            .get(0)
            .map_err(|e: rusqlite::Error| DomainError::Store(e.to_string()))?,
        user_id: UserId::new(
            row.get::<_, String>(1)
                .map_err(|e: rusqlite::Error| DomainError::Store(e.to_string()))?,
        ),
        full_name: row.get::<_, Option<String>>(2).unwrap_or(None),
        avatar_url: row.get::<_, Option<String>>(3).unwrap_or(None),
        created_at: row.get::<_, i64>(4).unwrap_or(0),
    })
}
