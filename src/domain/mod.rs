//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO external dependencies (except serde for serialization).

mod entity;
mod bookmark;
mod tag;
mod profile;

pub use entity::{Entity, DomainError, DomainResult};
pub use bookmark::{Bookmark, BookmarkPatch, BookmarkWithTags, NewBookmark};
pub use tag::{Tag, BookmarkTag};
pub use profile::{UserId, UserProfile};
