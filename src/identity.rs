//! Identity Seam
//!
//! Abstracts over whatever session/auth machinery the embedding application
//! uses. Services only need "who is acting right now"; a missing identity is
//! mapped to `DomainError::AuthRequired` at the service boundary.

use async_trait::async_trait;

use crate::domain::{DomainResult, UserId};

/// Supplies the acting user's identity
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The current user, or `None` when nobody is signed in
    async fn current_user(&self) -> DomainResult<Option<UserId>>;
}

/// Identity provider bound to a fixed user (or to nobody)
///
/// Useful for embedding contexts where the session was already resolved, and
/// for tests.
pub struct FixedIdentity {
    user: Option<UserId>,
}

impl FixedIdentity {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            user: Some(UserId::new(id)),
        }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

#[async_trait]
impl IdentityProvider for FixedIdentity {
    async fn current_user(&self) -> DomainResult<Option<UserId>> {
        Ok(self.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_identity() {
        let signed_in = FixedIdentity::user("u1");
        assert_eq!(
            signed_in.current_user().await.unwrap(),
            Some(UserId::new("u1"))
        );

        let nobody = FixedIdentity::anonymous();
        assert_eq!(nobody.current_user().await.unwrap(), None);
    }
}
