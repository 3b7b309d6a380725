//! Bookstash Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - identity: Acting-user seam
//! - repository: Data access abstractions and implementations
//! - service: Authenticated operations, including tag synchronization

use std::path::Path;
use std::sync::Arc;

pub mod domain;
pub mod identity;
pub mod repository;
pub mod service;

pub use domain::{
    Bookmark, BookmarkPatch, BookmarkTag, BookmarkWithTags, DomainError, DomainResult,
    NewBookmark, Tag, UserId, UserProfile,
};
pub use identity::{FixedIdentity, IdentityProvider};
pub use service::{normalize_names, BookmarkService, TagSynchronizer};

use repository::{init_db, BookmarkRepository, ProfileRepository, TagRepository};

/// Repositories and services wired over one database session
///
/// Constructed per logical session; holds no process-global state.
pub struct AppState {
    pub bookmarks: Arc<BookmarkRepository>,
    pub tags: Arc<TagRepository>,
    pub profiles: Arc<ProfileRepository>,
    pub service: BookmarkService,
}

impl AppState {
    /// Open the database at `db_path` and wire repositories and services
    pub fn open(db_path: &Path, identity: Arc<dyn IdentityProvider>) -> DomainResult<Self> {
        let conn = init_db(db_path)?;

        let bookmarks = Arc::new(BookmarkRepository::new(conn.clone()));
        let tags = Arc::new(TagRepository::new(conn.clone()));
        let profiles = Arc::new(ProfileRepository::new(conn));
        let service = BookmarkService::new(identity, bookmarks.clone(), tags.clone());

        Ok(Self {
            bookmarks,
            tags,
            profiles,
            service,
        })
    }
}
