//! Repository Layer
//!
//! Data access abstractions and SQLite-backed implementations. Every query
//! is scoped to the owning user (row-level authorization).

mod traits;
mod db;
mod bookmark_repo;
mod tag_repo;
mod bookmark_tag;
mod profile_repo;


pub use traits::OwnedRepository;
pub use db::{init_db, DbHandle};
pub use bookmark_repo::BookmarkRepository;
pub use tag_repo::TagRepository;
pub use bookmark_tag::BookmarkTagOperations;
pub use profile_repo::ProfileRepository;
