//! Tag service.

use reusify_core::{TagId, TagName, UserId};

use super::{AccessGuard, Operation, ServiceError};
use crate::db::{RepositoryError, Store};
use crate::models::{Tag, TagUsage};

/// Upper bound for a popular-tags request.
pub const MAX_POPULAR_LIMIT: u32 = 100;

/// Maximum number of tags returned by a tag search.
pub const SEARCH_LIMIT: u32 = 10;

const DUPLICATE_NAME_MESSAGE: &str = "A tag with this name already exists";

/// Tag operations scoped to a calling user.
pub struct TagService<'a> {
    store: &'a dyn Store,
    guard: AccessGuard<'a>,
    popular_default: u32,
}

impl<'a> TagService<'a> {
    /// Create a new tag service. `popular_default` is the popular-tags limit
    /// used when a request gives none.
    #[must_use]
    pub const fn new(store: &'a dyn Store, popular_default: u32) -> Self {
        Self {
            store,
            guard: AccessGuard::new(store),
            popular_default,
        }
    }

    /// Tags attached to any of the caller's snippets, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list_mine(&self, user: UserId) -> Result<Vec<Tag>, ServiceError> {
        Ok(self.store.list_tags_for_owner(user).await?)
    }

    /// Most used tags across all users.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn popular(&self, limit: Option<u32>) -> Result<Vec<TagUsage>, ServiceError> {
        let limit = clamp_limit(limit.unwrap_or(self.popular_default));
        Ok(self.store.popular_tags(limit).await?)
    }

    /// Case-insensitive search over all tag names.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Tag>, ServiceError> {
        Ok(self.store.search_tags(query.trim(), SEARCH_LIMIT).await?)
    }

    /// Return the tag called `name`, creating it if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the name is blank or too long.
    pub async fn create(&self, user: UserId, name: &str) -> Result<Tag, ServiceError> {
        let name = parse_name(name)?;
        Ok(self.store.find_or_create_tag(&name, user).await?)
    }

    /// Rename a tag used by one of the caller's snippets.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` if none of the caller's snippets
    /// carry the tag and `ServiceError::Validation` if the name is invalid
    /// or already taken by another tag.
    pub async fn rename(&self, user: UserId, id: TagId, name: &str) -> Result<Tag, ServiceError> {
        self.guard
            .require_tag_access(user, id, Operation::Update)
            .await?;
        let name = parse_name(name)?;

        if let Some(existing) = self.store.get_tag_by_name(&name).await? {
            if existing.id == id {
                return Ok(existing);
            }
            return Err(ServiceError::Validation(DUPLICATE_NAME_MESSAGE.to_owned()));
        }

        let tag = self.store.rename_tag(id, &name).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                ServiceError::Validation(DUPLICATE_NAME_MESSAGE.to_owned())
            }
            RepositoryError::NotFound => ServiceError::NotFound("Tag not found".to_owned()),
            other => ServiceError::Repository(other),
        })?;
        tracing::info!(%user, tag = %id, name = %tag.name, "tag renamed");
        Ok(tag)
    }

    /// Delete a tag used by one of the caller's snippets. The tag is removed
    /// from every snippet that carries it, including other users' snippets.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` if none of the caller's snippets
    /// carry the tag.
    pub async fn delete(&self, user: UserId, id: TagId) -> Result<(), ServiceError> {
        self.guard
            .require_tag_access(user, id, Operation::Delete)
            .await?;

        if !self.store.delete_tag(id).await? {
            return Err(ServiceError::NotFound("Tag not found".to_owned()));
        }
        tracing::info!(%user, tag = %id, "tag deleted");
        Ok(())
    }

    /// Detach a tag from all of the caller's snippets without deleting it.
    /// Returns the number of snippets changed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn remove_from_my_snippets(&self, user: UserId, id: TagId) -> Result<u64, ServiceError> {
        let removed = self.store.detach_tag_from_owner(user, id).await?;
        tracing::info!(%user, tag = %id, removed, "tag detached from snippets");
        Ok(removed)
    }
}

/// Clamp a requested popular-tags limit into `1..=MAX_POPULAR_LIMIT`.
#[must_use]
pub fn clamp_limit(requested: u32) -> u32 {
    requested.clamp(1, MAX_POPULAR_LIMIT)
}

fn parse_name(name: &str) -> Result<TagName, ServiceError> {
    TagName::parse(name).map_err(|e| ServiceError::Validation(format!("Invalid tag: {e}")))
}
