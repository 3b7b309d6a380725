//! Service Layer
//!
//! Authenticated operations over the repositories. The tag synchronizer
//! keeps the bookmark-tag join table consistent with a desired tag-name
//! list; the bookmark service wraps it with identity resolution and CRUD.

mod tag_sync;
mod bookmarks;

pub use tag_sync::{normalize_names, TagSynchronizer};
pub use bookmarks::BookmarkService;
