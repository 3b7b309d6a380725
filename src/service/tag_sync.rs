//! Tag Synchronizer
//!
//! Reconciles a bookmark's link set with a desired list of tag names:
//! missing tags are created (upsert on (owner, name)), then the link set is
//! replaced so it equals exactly the desired set. Tags that drop out of use
//! are kept for reuse; only links are removed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::debug;

use crate::domain::{BookmarkWithTags, DomainError, DomainResult, UserId};
use crate::repository::{
    BookmarkRepository, BookmarkTagOperations, OwnedRepository, TagRepository,
};

/// Trim, drop empties, and deduplicate preserving first-seen order
pub fn normalize_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_string()))
        .map(|name| name.to_string())
        .collect()
}

/// Synchronizes a bookmark's tag links with a desired tag-name list
pub struct TagSynchronizer {
    bookmarks: Arc<BookmarkRepository>,
    tags: Arc<TagRepository>,
}

impl TagSynchronizer {
    pub fn new(bookmarks: Arc<BookmarkRepository>, tags: Arc<TagRepository>) -> Self {
        Self { bookmarks, tags }
    }

    /// Make the bookmark's link set equal exactly the desired tag names
    ///
    /// On success every desired name exists as a tag row owned by `owner`
    /// and the bookmark is linked to precisely those tags, in desired order.
    /// Fails with `NotFound` when the bookmark is absent or owned by someone
    /// else, in which case nothing is mutated. Concurrent calls for the same
    /// bookmark are not mutually excluded; the last writer's link set wins.
    pub async fn sync_tags(
        &self,
        owner: &UserId,
        bookmark_id: u32,
        desired: &[String],
    ) -> DomainResult<BookmarkWithTags> {
        let bookmark = self
            .bookmarks
            .find_by_id(owner, bookmark_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("bookmark {}", bookmark_id)))?;

        let desired = normalize_names(desired);
        debug!(
            "syncing {} tag(s) for bookmark {}",
            desired.len(),
            bookmark_id
        );

        let existing = self.tags.find_by_names(owner, &desired).await?;
        let mut by_name: HashMap<String, u32> = existing
            .into_iter()
            .map(|tag| (tag.name, tag.id))
            .collect();

        let missing: Vec<String> = desired
            .iter()
            .filter(|name| !by_name.contains_key(name.as_str()))
            .cloned()
            .collect();

        if !missing.is_empty() {
            let created = self.tags.upsert_names(owner, &missing).await?;
            for tag in created {
                by_name.insert(tag.name, tag.id);
            }
        }

        // A desired name that still failed to resolve is dropped rather than
        // failing the whole operation
        let link_ids: Vec<u32> = desired
            .iter()
            .filter_map(|name| by_name.get(name).copied())
            .collect();

        self.tags.replace_links(bookmark_id, &link_ids).await?;

        let tags = self.tags.tags_for_bookmark(bookmark_id).await?;
        Ok(BookmarkWithTags {
            bookmark,
            tags: tags.into_iter().map(|tag| tag.name).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bookmark;
    use crate::repository::init_db;
    use std::path::PathBuf;

    fn setup() -> (Arc<BookmarkRepository>, Arc<TagRepository>, TagSynchronizer) {
        let conn = init_db(&PathBuf::from(":memory:")).expect("init failed");
        let bookmarks = Arc::new(BookmarkRepository::new(conn.clone()));
        let tags = Arc::new(TagRepository::new(conn));
        let sync = TagSynchronizer::new(bookmarks.clone(), tags.clone());
        (bookmarks, tags, sync)
    }

    async fn seed_bookmark(repo: &BookmarkRepository, owner: &UserId) -> Bookmark {
        let bookmark = Bookmark::new(
            0,
            owner.clone(),
            "https://example.com".to_string(),
            "Example".to_string(),
        );
        repo.create(owner, &bookmark).await.expect("create failed")
    }

    #[test]
    fn test_normalize_trims_and_dedupes() {
        let names = vec![
            "  rust ".to_string(),
            "".to_string(),
            "rust".to_string(),
            "   ".to_string(),
            "web".to_string(),
            "rust".to_string(),
        ];
        assert_eq!(normalize_names(&names), vec!["rust", "web"]);
    }

    #[test]
    fn test_normalize_is_case_sensitive() {
        let names = vec!["Work".to_string(), "work".to_string()];
        assert_eq!(normalize_names(&names), vec!["Work", "work"]);
    }

    #[tokio::test]
    async fn test_duplicates_create_one_tag_and_one_link() {
        let (bookmarks, tags, sync) = setup();
        let owner = UserId::new("u1");
        let bookmark = seed_bookmark(&bookmarks, &owner).await;

        let view = sync
            .sync_tags(&owner, bookmark.id, &["rust".to_string(), "rust".to_string()])
            .await
            .expect("sync failed");

        assert_eq!(view.tags, vec!["rust"]);
        assert_eq!(tags.list(&owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sync_is_idempotent_under_repetition() {
        let (bookmarks, _tags, sync) = setup();
        let owner = UserId::new("u1");
        let bookmark = seed_bookmark(&bookmarks, &owner).await;
        let desired = vec!["a".to_string(), "b".to_string()];

        let first = sync.sync_tags(&owner, bookmark.id, &desired).await.unwrap();
        let second = sync.sync_tags(&owner, bookmark.id, &desired).await.unwrap();

        assert_eq!(first.tags, vec!["a", "b"]);
        assert_eq!(second.tags, first.tags);
    }

    #[tokio::test]
    async fn test_empty_list_removes_links_creates_nothing() {
        let (bookmarks, tags, sync) = setup();
        let owner = UserId::new("u1");
        let bookmark = seed_bookmark(&bookmarks, &owner).await;

        sync.sync_tags(&owner, bookmark.id, &["a".to_string()])
            .await
            .unwrap();
        let view = sync.sync_tags(&owner, bookmark.id, &[]).await.unwrap();

        assert!(view.tags.is_empty());
        // The tag row survives even with no links left
        assert_eq!(tags.list(&owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_set_scenario() {
        // Linked to {a, b}; desiring [b, c, c] must create c once, keep b,
        // and unlink a while keeping its tag row
        let (bookmarks, tags, sync) = setup();
        let owner = UserId::new("u1");
        let bookmark = seed_bookmark(&bookmarks, &owner).await;

        sync.sync_tags(&owner, bookmark.id, &["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        let view = sync
            .sync_tags(
                &owner,
                bookmark.id,
                &["b".to_string(), "c".to_string(), "c".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(view.tags, vec!["b", "c"]);
        let names: Vec<String> = tags
            .list(&owner)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_owners_get_distinct_tag_rows() {
        let (bookmarks, tags, sync) = setup();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        let a_bookmark = seed_bookmark(&bookmarks, &alice).await;
        let b_bookmark = seed_bookmark(&bookmarks, &bob).await;

        sync.sync_tags(&alice, a_bookmark.id, &["work".to_string()])
            .await
            .unwrap();
        sync.sync_tags(&bob, b_bookmark.id, &["work".to_string()])
            .await
            .unwrap();

        let alice_tags = tags.list(&alice).await.unwrap();
        let bob_tags = tags.list(&bob).await.unwrap();
        assert_eq!(alice_tags.len(), 1);
        assert_eq!(bob_tags.len(), 1);
        assert_ne!(alice_tags[0].id, bob_tags[0].id);

        // No cross-owner link was created
        let alice_with_work = tags
            .bookmarks_with_tag(&alice, alice_tags[0].id)
            .await
            .unwrap();
        assert_eq!(alice_with_work, vec![a_bookmark.id]);
    }

    #[tokio::test]
    async fn test_foreign_bookmark_fails_not_found_without_mutation() {
        let (bookmarks, tags, sync) = setup();
        let owner = UserId::new("u1");
        let intruder = UserId::new("u2");
        let bookmark = seed_bookmark(&bookmarks, &owner).await;

        sync.sync_tags(&owner, bookmark.id, &["a".to_string()])
            .await
            .unwrap();

        let err = sync
            .sync_tags(&intruder, bookmark.id, &["evil".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        // Existing links untouched, no tag created for the intruder
        let linked: Vec<String> = tags
            .tags_for_bookmark(bookmark.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(linked, vec!["a"]);
        assert!(tags.list(&intruder).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_link_order_follows_desired_order() {
        let (bookmarks, _tags, sync) = setup();
        let owner = UserId::new("u1");
        let bookmark = seed_bookmark(&bookmarks, &owner).await;

        let view = sync
            .sync_tags(
                &owner,
                bookmark.id,
                &["zebra".to_string(), "apple".to_string(), "mango".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(view.tags, vec!["zebra", "apple", "mango"]);
    }
}
