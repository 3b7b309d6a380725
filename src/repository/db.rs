//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations. The handle is constructed
//! per logical session and passed explicitly into each repository; nothing
//! here is process-global.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

/// Shared connection handle passed into repositories
pub type DbHandle = Arc<Mutex<Connection>>;

/// Open (or create) the database at `db_path` and run migrations
///
/// `:memory:` is accepted for an in-memory database.
pub fn init_db(db_path: &Path) -> DomainResult<DbHandle> {
    let conn = Connection::open(db_path).map_err(|e| DomainError::Store(e.to_string()))?;

    conn.execute_batch("PRAGMA foreign_keys = ON")
        .map_err(|e| DomainError::Store(e.to_string()))?;

    run_migrations(&conn)?;

    Ok(Arc::new(Mutex::new(conn)))
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(mut rows) = stmt.query([]) else {
        return false;
    };
    while let Ok(Some(row)) = rows.next() {
        if let Ok(name) = row.get::<_, String>(1) {
            if name == column {
                return true;
            }
        }
    }
    false
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL UNIQUE,
            full_name TEXT,
            avatar_url TEXT,
            created_at INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )
    .map_err(|e| DomainError::Store(e.to_string()))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bookmarks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            url TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            is_public INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL DEFAULT 0,
            updated_at INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )
    .map_err(|e| DomainError::Store(e.to_string()))?;

    // Sharing columns arrived after the initial schema
    if !column_exists(conn, "bookmarks", "shared_by") {
        conn.execute("ALTER TABLE bookmarks ADD COLUMN shared_by TEXT", ())
            .map_err(|e| format!("Failed to add shared_by: {}", e))
            .map_err(DomainError::Store)?;
    }

    if !column_exists(conn, "bookmarks", "shared_with") {
        conn.execute("ALTER TABLE bookmarks ADD COLUMN shared_with TEXT", ())
            .map_err(|e| format!("Failed to add shared_with: {}", e))
            .map_err(DomainError::Store)?;
    }

    // (user_id, name) is the conflict target for the tag upsert
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at INTEGER NOT NULL DEFAULT 0,
            UNIQUE(user_id, name)
        )",
        (),
    )
    .map_err(|e| DomainError::Store(e.to_string()))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bookmark_tags (
            bookmark_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            PRIMARY KEY (bookmark_id, tag_id)
        )",
        (),
    )
    .map_err(|e| DomainError::Store(e.to_string()))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_bookmarks_user ON bookmarks(user_id)",
        (),
    )
    .map_err(|e| DomainError::Store(e.to_string()))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_bookmark_tags_tag ON bookmark_tags(tag_id)",
        (),
    )
    .map_err(|e| DomainError::Store(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_init_in_memory() {
        let handle = init_db(&PathBuf::from(":memory:")).expect("init failed");
        let conn = handle.try_lock().unwrap();
        assert!(column_exists(&conn, "bookmarks", "shared_with"));
        assert!(column_exists(&conn, "tags", "name"));
    }

    #[test]
    fn test_init_is_rerunnable_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookstash.db");

        // Second open must migrate the already-migrated file cleanly
        drop(init_db(&path).expect("first open failed"));
        drop(init_db(&path).expect("second open failed"));
    }
}
