//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;
use crate::domain::{Entity, DomainResult, UserId};

/// Core repository trait for owner-scoped CRUD operations
///
/// Generic over any Entity type. Every operation takes the acting owner and
/// must only ever touch rows belonging to that owner; a row owned by someone
/// else behaves exactly like an absent row.
#[async_trait]
pub trait OwnedRepository<T: Entity>: Send + Sync {
    /// Create a new entity owned by `owner`
    async fn create(&self, owner: &UserId, entity: &T) -> DomainResult<T>;

    /// Find entity by ID, if it exists and belongs to `owner`
    async fn find_by_id(&self, owner: &UserId, id: T::Id) -> DomainResult<Option<T>>;

    /// List all entities owned by `owner`
    async fn list(&self, owner: &UserId) -> DomainResult<Vec<T>>;

    /// Update an existing entity owned by `owner`
    async fn update(&self, owner: &UserId, entity: &T) -> DomainResult<T>;

    /// Delete entity by ID if it belongs to `owner`
    async fn delete(&self, owner: &UserId, id: T::Id) -> DomainResult<()>;
}
