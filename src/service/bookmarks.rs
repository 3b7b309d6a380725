//! Bookmark Service
//!
//! Authenticated operations exposed to the embedding application. Every
//! operation resolves the acting user first; anonymous callers get
//! `AuthRequired`. Tag-set changes route through the tag synchronizer.

use std::sync::Arc;

use log::debug;

use crate::domain::{
    Bookmark, BookmarkPatch, BookmarkWithTags, DomainError, DomainResult, NewBookmark, Tag, UserId,
};
use crate::identity::IdentityProvider;
use crate::repository::{
    BookmarkRepository, BookmarkTagOperations, OwnedRepository, TagRepository,
};
use super::tag_sync::TagSynchronizer;

/// Authenticated bookmark operations
pub struct BookmarkService {
    identity: Arc<dyn IdentityProvider>,
    bookmarks: Arc<BookmarkRepository>,
    tags: Arc<TagRepository>,
    sync: TagSynchronizer,
}

impl BookmarkService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        bookmarks: Arc<BookmarkRepository>,
        tags: Arc<TagRepository>,
    ) -> Self {
        let sync = TagSynchronizer::new(bookmarks.clone(), tags.clone());
        Self {
            identity,
            bookmarks,
            tags,
            sync,
        }
    }

    async fn require_user(&self) -> DomainResult<UserId> {
        self.identity
            .current_user()
            .await?
            .ok_or(DomainError::AuthRequired)
    }

    async fn with_tags(&self, bookmark: Bookmark) -> DomainResult<BookmarkWithTags> {
        let tags = self.tags.tags_for_bookmark(bookmark.id).await?;
        Ok(BookmarkWithTags {
            bookmark,
            tags: tags.into_iter().map(|tag| tag.name).collect(),
        })
    }

    /// Create a bookmark, syncing tags when a tag list was provided
    pub async fn create(&self, input: NewBookmark) -> DomainResult<BookmarkWithTags> {
        let owner = self.require_user().await?;

        let mut bookmark = Bookmark::new(0, owner.clone(), input.url, input.title);
        bookmark.description = input.description;
        bookmark.is_public = input.is_public;

        let created = self.bookmarks.create(&owner, &bookmark).await?;
        debug!("created bookmark {} for {}", created.id, owner);

        match input.tags {
            Some(names) => self.sync.sync_tags(&owner, created.id, &names).await,
            None => self.with_tags(created).await,
        }
    }

    /// Fetch one bookmark with its tags
    pub async fn get(&self, id: u32) -> DomainResult<BookmarkWithTags> {
        let owner = self.require_user().await?;
        let bookmark = self
            .bookmarks
            .find_by_id(&owner, id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("bookmark {}", id)))?;
        self.with_tags(bookmark).await
    }

    /// List the caller's bookmarks with tags, newest first
    pub async fn list(&self) -> DomainResult<Vec<BookmarkWithTags>> {
        let owner = self.require_user().await?;
        let bookmarks = self.bookmarks.list(&owner).await?;

        let mut views = Vec::with_capacity(bookmarks.len());
        for bookmark in bookmarks {
            views.push(self.with_tags(bookmark).await?);
        }
        Ok(views)
    }

    /// Apply a partial update; an omitted tags field leaves links untouched
    pub async fn update(&self, id: u32, patch: BookmarkPatch) -> DomainResult<BookmarkWithTags> {
        let owner = self.require_user().await?;

        let mut bookmark = self
            .bookmarks
            .find_by_id(&owner, id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("bookmark {}", id)))?;

        if let Some(url) = patch.url {
            bookmark.url = url;
        }
        if let Some(title) = patch.title {
            bookmark.title = title;
        }
        if let Some(description) = patch.description {
            bookmark.description = Some(description);
        }
        if let Some(is_public) = patch.is_public {
            bookmark.is_public = is_public;
        }

        let updated = self.bookmarks.update(&owner, &bookmark).await?;

        match patch.tags {
            Some(names) => self.sync.sync_tags(&owner, id, &names).await,
            None => self.with_tags(updated).await,
        }
    }

    /// Delete a bookmark and its links; tag rows are kept
    pub async fn delete(&self, id: u32) -> DomainResult<()> {
        let owner = self.require_user().await?;
        self.bookmarks.delete(&owner, id).await
    }

    /// Mark a bookmark public and record who it was shared with
    pub async fn share(&self, id: u32, recipient: &str) -> DomainResult<BookmarkWithTags> {
        let owner = self.require_user().await?;

        let mut bookmark = self
            .bookmarks
            .find_by_id(&owner, id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("bookmark {}", id)))?;

        bookmark.is_public = true;
        bookmark.shared_by = Some(owner.as_str().to_string());
        bookmark.shared_with = Some(recipient.to_string());

        let updated = self.bookmarks.update(&owner, &bookmark).await?;
        debug!("shared bookmark {} with {}", id, recipient);
        self.with_tags(updated).await
    }

    /// Replace a bookmark's tag set with the desired name list
    pub async fn sync_tags(&self, id: u32, desired: &[String]) -> DomainResult<BookmarkWithTags> {
        let owner = self.require_user().await?;
        self.sync.sync_tags(&owner, id, desired).await
    }

    /// List the caller's tags by name
    pub async fn list_tags(&self) -> DomainResult<Vec<Tag>> {
        let owner = self.require_user().await?;
        self.tags.list(&owner).await
    }

    /// Delete a tag and every link pointing at it
    pub async fn delete_tag(&self, tag_id: u32) -> DomainResult<()> {
        let owner = self.require_user().await?;
        self.tags.delete(&owner, tag_id).await
    }

    /// The caller's bookmarks carrying a specific tag, newest first
    pub async fn bookmarks_with_tag(&self, tag_id: u32) -> DomainResult<Vec<BookmarkWithTags>> {
        let owner = self.require_user().await?;

        let ids = self.tags.bookmarks_with_tag(&owner, tag_id).await?;
        let mut views = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(bookmark) = self.bookmarks.find_by_id(&owner, id).await? {
                views.push(self.with_tags(bookmark).await?);
            }
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::FixedIdentity;
    use crate::repository::init_db;
    use std::path::PathBuf;

    fn service_for(identity: FixedIdentity) -> BookmarkService {
        let conn = init_db(&PathBuf::from(":memory:")).expect("init failed");
        let bookmarks = Arc::new(BookmarkRepository::new(conn.clone()));
        let tags = Arc::new(TagRepository::new(conn));
        BookmarkService::new(Arc::new(identity), bookmarks, tags)
    }

    fn new_bookmark(tags: Option<Vec<&str>>) -> NewBookmark {
        NewBookmark {
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            description: None,
            is_public: false,
            tags: tags.map(|names| names.into_iter().map(String::from).collect()),
        }
    }

    #[tokio::test]
    async fn test_anonymous_caller_gets_auth_required() {
        let service = service_for(FixedIdentity::anonymous());
        let err = service.create(new_bookmark(None)).await.unwrap_err();
        assert_eq!(err, DomainError::AuthRequired);
        assert_eq!(service.list().await.unwrap_err(), DomainError::AuthRequired);
    }

    #[tokio::test]
    async fn test_create_with_tags_returns_materialized_view() {
        let service = service_for(FixedIdentity::user("u1"));

        let view = service
            .create(new_bookmark(Some(vec!["rust", "web"])))
            .await
            .expect("create failed");

        assert!(view.bookmark.id > 0);
        assert_eq!(view.tags, vec!["rust", "web"]);
        assert!(view.bookmark.created_at > 0);
    }

    #[tokio::test]
    async fn test_create_without_tags() {
        let service = service_for(FixedIdentity::user("u1"));
        let view = service.create(new_bookmark(None)).await.unwrap();
        assert!(view.tags.is_empty());
    }

    #[tokio::test]
    async fn test_update_without_tags_field_keeps_links() {
        let service = service_for(FixedIdentity::user("u1"));
        let created = service
            .create(new_bookmark(Some(vec!["keep"])))
            .await
            .unwrap();

        let patch = BookmarkPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = service.update(created.bookmark.id, patch).await.unwrap();

        assert_eq!(updated.bookmark.title, "Renamed");
        assert_eq!(updated.tags, vec!["keep"]);
    }

    #[tokio::test]
    async fn test_update_with_empty_tags_clears_links() {
        let service = service_for(FixedIdentity::user("u1"));
        let created = service
            .create(new_bookmark(Some(vec!["gone"])))
            .await
            .unwrap();

        let patch = BookmarkPatch {
            tags: Some(Vec::new()),
            ..Default::default()
        };
        let updated = service.update(created.bookmark.id, patch).await.unwrap();

        assert!(updated.tags.is_empty());
        // The tag row itself is retained
        let names: Vec<String> = service
            .list_tags()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["gone"]);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_with_tags() {
        let service = service_for(FixedIdentity::user("u1"));
        let first = service.create(new_bookmark(Some(vec!["a"]))).await.unwrap();
        let second = service.create(new_bookmark(Some(vec!["b"]))).await.unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].bookmark.id, second.bookmark.id);
        assert_eq!(listed[1].bookmark.id, first.bookmark.id);
        assert_eq!(listed[0].tags, vec!["b"]);
    }

    #[tokio::test]
    async fn test_delete_removes_bookmark_keeps_tags() {
        let service = service_for(FixedIdentity::user("u1"));
        let created = service
            .create(new_bookmark(Some(vec!["stays"])))
            .await
            .unwrap();

        service.delete(created.bookmark.id).await.unwrap();

        let err = service.get(created.bookmark.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(service.list_tags().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_share_sets_sharing_metadata() {
        let service = service_for(FixedIdentity::user("u1"));
        let created = service.create(new_bookmark(None)).await.unwrap();

        let shared = service
            .share(created.bookmark.id, "friend@example.com")
            .await
            .unwrap();

        assert!(shared.bookmark.is_public);
        assert_eq!(shared.bookmark.shared_by.as_deref(), Some("u1"));
        assert_eq!(
            shared.bookmark.shared_with.as_deref(),
            Some("friend@example.com")
        );
    }

    #[tokio::test]
    async fn test_bookmarks_with_tag_filters_by_owner_tag() {
        let service = service_for(FixedIdentity::user("u1"));
        let tagged = service
            .create(new_bookmark(Some(vec!["filter"])))
            .await
            .unwrap();
        service.create(new_bookmark(None)).await.unwrap();

        let tags = service.list_tags().await.unwrap();
        let views = service.bookmarks_with_tag(tags[0].id).await.unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].bookmark.id, tagged.bookmark.id);
    }

    #[tokio::test]
    async fn test_delete_tag_unlinks_bookmarks() {
        let service = service_for(FixedIdentity::user("u1"));
        let created = service
            .create(new_bookmark(Some(vec!["doomed", "other"])))
            .await
            .unwrap();

        let doomed = service
            .list_tags()
            .await
            .unwrap()
            .into_iter()
            .find(|t| t.name == "doomed")
            .unwrap();
        service.delete_tag(doomed.id).await.unwrap();

        let view = service.get(created.bookmark.id).await.unwrap();
        assert_eq!(view.tags, vec!["other"]);
    }
}
