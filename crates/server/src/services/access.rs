//! Ownership checks.
//!
//! Snippets may only be changed by their owner. Tags have no owner in that
//! sense: a user may rename or delete a tag once at least one of their own
//! snippets carries it.

use reusify_core::{SnippetId, TagId, UserId};

use super::ServiceError;
use crate::db::Store;

/// A mutating operation, used to word permission errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Update,
    Delete,
}

impl Operation {
    const fn snippet_verb(self) -> &'static str {
        match self {
            Self::Update => "modify",
            Self::Delete => "delete",
        }
    }

    const fn tag_verb(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Authorization checks run before every snippet or tag mutation.
#[derive(Clone, Copy)]
pub struct AccessGuard<'a> {
    store: &'a dyn Store,
}

impl<'a> AccessGuard<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Require that `snippet` exists and belongs to `user`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the snippet does not exist and
    /// `ServiceError::Forbidden` if someone else owns it.
    pub async fn require_snippet_owner(
        &self,
        user: UserId,
        snippet: SnippetId,
        op: Operation,
    ) -> Result<(), ServiceError> {
        let owner = self
            .store
            .snippet_owner(snippet)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Snippet not found".to_owned()))?;

        if owner != user {
            tracing::warn!(%user, %snippet, ?op, "snippet access denied");
            return Err(ServiceError::Forbidden(format!(
                "Forbidden: You don't have permission to {} this snippet",
                op.snippet_verb()
            )));
        }
        Ok(())
    }

    /// Require that at least one of `user`'s snippets carries `tag`.
    ///
    /// A tag that does not exist is carried by nobody, so it is reported as
    /// forbidden rather than missing.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` if the user has no snippet with the tag.
    pub async fn require_tag_access(
        &self,
        user: UserId,
        tag: TagId,
        op: Operation,
    ) -> Result<(), ServiceError> {
        if self.store.owner_uses_tag(user, tag).await? {
            return Ok(());
        }
        tracing::warn!(%user, %tag, ?op, "tag access denied");
        Err(ServiceError::Forbidden(format!(
            "You don't have permission to {} this tag",
            op.tag_verb()
        )))
    }
}
