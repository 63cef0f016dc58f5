//! Snippet service.

use reusify_core::{SnippetId, TagId, TagName, UserId};

use super::{AccessGuard, Operation, ServiceError};
use crate::db::{RepositoryError, Store};
use crate::models::{NewSnippet, OwnerSummary, Snippet, SnippetChanges, SnippetInput};

/// Message for a create request missing one of the required fields.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Title, content and language are required";

/// Snippet operations scoped to a calling user.
pub struct SnippetService<'a> {
    store: &'a dyn Store,
    guard: AccessGuard<'a>,
}

impl<'a> SnippetService<'a> {
    /// Create a new snippet service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            guard: AccessGuard::new(store),
        }
    }

    /// List the caller's snippets, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list_mine(&self, user: UserId) -> Result<Vec<Snippet>, ServiceError> {
        Ok(self.store.list_snippets_for_owner(user).await?)
    }

    /// Get a snippet and a summary of its owner. Any signed-in user may read
    /// any snippet.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the snippet does not exist.
    pub async fn get(&self, id: SnippetId) -> Result<(Snippet, OwnerSummary), ServiceError> {
        let snippet = self
            .store
            .get_snippet(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Snippet not found".to_owned()))?;

        let owner = self.store.get_user(snippet.user_id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("snippet {id} has no owner"))
        })?;

        let summary = OwnerSummary {
            id: owner.id,
            name: owner.name.to_string(),
        };
        Ok((snippet, summary))
    }

    /// Create a snippet owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if title, language or content is
    /// missing or blank, or a tag name is invalid.
    pub async fn create(&self, user: UserId, input: SnippetInput) -> Result<Snippet, ServiceError> {
        let snippet = validate_new(input)?;
        let created = self.store.create_snippet(user, &snippet).await?;
        tracing::info!(%user, snippet = %created.id, tags = created.tags.len(), "snippet created");
        Ok(created)
    }

    /// Update one of the caller's snippets.
    ///
    /// Omitted fields are left unchanged. A supplied tag list replaces the
    /// snippet's tags entirely.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the snippet does not exist,
    /// `ServiceError::Forbidden` if the caller does not own it, and
    /// `ServiceError::Validation` for blank fields or invalid tag names.
    pub async fn update(
        &self,
        user: UserId,
        id: SnippetId,
        input: SnippetInput,
    ) -> Result<Snippet, ServiceError> {
        self.guard
            .require_snippet_owner(user, id, Operation::Update)
            .await?;
        let changes = validate_changes(input)?;

        let updated = self
            .store
            .update_snippet(id, user, &changes)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound("Snippet not found".to_owned()),
                other => ServiceError::Repository(other),
            })?;
        tracing::info!(%user, snippet = %id, "snippet updated");
        Ok(updated)
    }

    /// Delete one of the caller's snippets. Its tags are kept.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the snippet does not exist and
    /// `ServiceError::Forbidden` if the caller does not own it.
    pub async fn delete(&self, user: UserId, id: SnippetId) -> Result<(), ServiceError> {
        self.guard
            .require_snippet_owner(user, id, Operation::Delete)
            .await?;

        if !self.store.delete_snippet(id).await? {
            return Err(ServiceError::NotFound("Snippet not found".to_owned()));
        }
        tracing::info!(%user, snippet = %id, "snippet deleted");
        Ok(())
    }

    /// Search the caller's snippets by title, content and tag names.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn search(&self, user: UserId, query: &str) -> Result<Vec<Snippet>, ServiceError> {
        Ok(self.store.search_snippets(user, query.trim()).await?)
    }

    /// List the caller's snippets carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list_by_tag(&self, user: UserId, tag: TagId) -> Result<Vec<Snippet>, ServiceError> {
        Ok(self.store.list_snippets_with_tag(user, tag).await?)
    }
}

/// A required text field: present and not just whitespace.
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_tags(names: &[String]) -> Result<Vec<TagName>, ServiceError> {
    TagName::parse_list(names).map_err(|e| ServiceError::Validation(format!("Invalid tag: {e}")))
}

fn validate_new(input: SnippetInput) -> Result<NewSnippet, ServiceError> {
    let (Some(title), Some(language), Some(content)) = (
        required(input.title),
        required(input.language),
        required(input.content),
    ) else {
        return Err(ServiceError::Validation(REQUIRED_FIELDS_MESSAGE.to_owned()));
    };

    let tags = parse_tags(input.tags.as_deref().unwrap_or_default())?;
    Ok(NewSnippet {
        title,
        language,
        content,
        tags,
    })
}

fn validate_changes(input: SnippetInput) -> Result<SnippetChanges, ServiceError> {
    fn optional(value: Option<String>, field: &str) -> Result<Option<String>, ServiceError> {
        match value {
            Some(v) if v.trim().is_empty() => {
                Err(ServiceError::Validation(format!("{field} cannot be empty")))
            }
            other => Ok(other),
        }
    }

    Ok(SnippetChanges {
        title: optional(input.title, "Title")?,
        language: optional(input.language, "Language")?,
        content: optional(input.content, "Content")?,
        tags: input.tags.as_deref().map(parse_tags).transpose()?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reusify_core::{DisplayName, Email};

    use super::*;
    use crate::db::{MemoryStore, UserStore};

    async fn store_with_users() -> (MemoryStore, UserId, UserId) {
        let store = MemoryStore::new();
        let alice = store
            .create_user(
                &DisplayName::parse("Alice").unwrap(),
                &Email::parse("alice@example.com").unwrap(),
                "hash",
            )
            .await
            .unwrap();
        let bob = store
            .create_user(
                &DisplayName::parse("Bob").unwrap(),
                &Email::parse("bob@example.com").unwrap(),
                "hash",
            )
            .await
            .unwrap();
        (store, alice.id, bob.id)
    }

    fn input(title: &str, tags: &[&str]) -> SnippetInput {
        SnippetInput {
            title: Some(title.to_owned()),
            language: Some("TypeScript".to_owned()),
            content: Some("const x=1".to_owned()),
            tags: Some(tags.iter().map(ToString::to_string).collect()),
        }
    }

    #[test]
    fn test_validate_new_requires_fields() {
        let missing = SnippetInput {
            title: Some("X".to_owned()),
            language: None,
            content: Some("c".to_owned()),
            tags: None,
        };
        let err = validate_new(missing).unwrap_err();
        assert_eq!(err.to_string(), REQUIRED_FIELDS_MESSAGE);

        let blank = SnippetInput {
            title: Some("   ".to_owned()),
            language: Some("Rust".to_owned()),
            content: Some("c".to_owned()),
            tags: None,
        };
        assert!(matches!(validate_new(blank), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_validate_new_dedupes_tags() {
        let snippet = validate_new(input("X", &["demo", "demo ", "new"])).unwrap();
        let names: Vec<&str> = snippet.tags.iter().map(TagName::as_str).collect();
        assert_eq!(names, vec!["demo", "new"]);
    }

    #[test]
    fn test_validate_changes_rejects_blank_supplied_field() {
        let changes = SnippetInput {
            content: Some("\n".to_owned()),
            ..SnippetInput::default()
        };
        let err = validate_changes(changes).unwrap_err();
        assert_eq!(err.to_string(), "Content cannot be empty");
    }

    #[test]
    fn test_validate_changes_distinguishes_omitted_and_empty_tags() {
        let omitted = validate_changes(SnippetInput::default()).unwrap();
        assert!(omitted.tags.is_none());

        let cleared = validate_changes(SnippetInput {
            tags: Some(Vec::new()),
            ..SnippetInput::default()
        })
        .unwrap();
        assert_eq!(cleared.tags, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_create_update_delete_scenario() {
        let (store, alice, _) = store_with_users().await;
        let service = SnippetService::new(&store);

        let created = service.create(alice, input("X", &["demo"])).await.unwrap();
        let (fetched, owner) = service.get(created.id).await.unwrap();
        assert_eq!(fetched.tag_names(), vec!["demo"]);
        assert_eq!(owner.name, "Alice");

        let update = SnippetInput {
            tags: Some(vec!["demo".to_owned(), "new".to_owned()]),
            ..SnippetInput::default()
        };
        service.update(alice, created.id, update).await.unwrap();
        let (fetched, _) = service.get(created.id).await.unwrap();
        assert_eq!(fetched.tag_names(), vec!["demo", "new"]);
        assert_eq!(fetched.title, "X");

        service.delete(alice, created.id).await.unwrap();
        assert!(matches!(
            service.get(created.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_other_user_cannot_mutate() {
        let (store, alice, bob) = store_with_users().await;
        let service = SnippetService::new(&store);
        let created = service.create(alice, input("X", &[])).await.unwrap();

        let update = service
            .update(bob, created.id, input("hijacked", &[]))
            .await;
        assert!(matches!(update, Err(ServiceError::Forbidden(_))));

        let delete = service.delete(bob, created.id).await;
        assert!(matches!(delete, Err(ServiceError::Forbidden(_))));

        assert!(service.list_mine(bob).await.unwrap().is_empty());
        assert_eq!(service.list_mine(alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_is_scoped_to_caller() {
        let (store, alice, bob) = store_with_users().await;
        let service = SnippetService::new(&store);
        service.create(alice, input("alice query", &["sql"])).await.unwrap();
        service.create(bob, input("bob query", &["sql"])).await.unwrap();

        let found = service.search(alice, "SQL").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.iter().all(|s| s.user_id == alice));

        let everything = service.search(alice, "").await.unwrap();
        assert_eq!(everything.len(), 1);
    }

    #[tokio::test]
    async fn test_list_by_tag() {
        let (store, alice, _) = store_with_users().await;
        let service = SnippetService::new(&store);
        let tagged = service.create(alice, input("a", &["rust"])).await.unwrap();
        service.create(alice, input("b", &["go"])).await.unwrap();

        let tag = tagged.tags.first().unwrap().id;
        let found = service.list_by_tag(alice, tag).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found.first().unwrap().id, tagged.id);
    }
}
