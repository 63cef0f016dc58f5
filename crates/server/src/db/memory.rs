//! In-process [`Store`](super::Store) adapter.
//!
//! Backs the router in tests and local demos. All tables live behind one
//! `RwLock`, so every operation is atomic with respect to the others.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use reusify_core::{DisplayName, Email, SnippetId, TagId, TagName, UserId};

use super::{RepositoryError, SnippetStore, Store, TagStore, UserStore};
use crate::models::{NewSnippet, Snippet, SnippetChanges, Tag, TagUsage, User};

struct UserRecord {
    user: User,
    password_hash: String,
}

struct SnippetRecord {
    id: SnippetId,
    title: String,
    content: String,
    language: String,
    user_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, UserRecord>,
    snippets: BTreeMap<SnippetId, SnippetRecord>,
    tags: BTreeMap<TagId, Tag>,
    links: BTreeSet<(SnippetId, TagId)>,
    next_id: i32,
    last_tick: Option<DateTime<Utc>>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// Strictly increasing timestamps, so "most recently updated" is total.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_tick {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(ts);
        ts
    }

    fn tags_of(&self, snippet: SnippetId) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .links
            .range((snippet, TagId::new(i32::MIN))..=(snippet, TagId::new(i32::MAX)))
            .filter_map(|(_, tag)| self.tags.get(tag).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    fn to_snippet(&self, record: &SnippetRecord) -> Snippet {
        Snippet {
            id: record.id,
            title: record.title.clone(),
            content: record.content.clone(),
            language: record.language.clone(),
            user_id: record.user_id,
            tags: self.tags_of(record.id),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// Snippets matching `pred`, most recently updated first.
    fn snippets_where(&self, pred: impl Fn(&SnippetRecord) -> bool) -> Vec<Snippet> {
        let mut matched: Vec<&SnippetRecord> = self.snippets.values().filter(|r| pred(r)).collect();
        matched.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        matched.into_iter().map(|r| self.to_snippet(r)).collect()
    }

    fn upsert_tag(&mut self, name: &TagName, creator: UserId) -> Tag {
        if let Some(tag) = self.tags.values().find(|t| &t.name == name) {
            return tag.clone();
        }
        let tag = Tag {
            id: TagId::new(self.next_id()),
            name: name.clone(),
            user_id: Some(creator),
            created_at: self.tick(),
        };
        self.tags.insert(tag.id, tag.clone());
        tag
    }

    fn attach_tags(&mut self, snippet: SnippetId, names: &[TagName], creator: UserId) {
        for name in names {
            let tag = self.upsert_tag(name, creator);
            self.links.insert((snippet, tag.id));
        }
    }

    fn user_exists(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }
}

/// Store keeping every table in process memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(
        &self,
        name: &DisplayName,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|r| &r.user.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = t.tick();
        let user = User {
            id: UserId::new(t.next_id()),
            name: name.clone(),
            email: email.clone(),
            created_at: now,
            updated_at: now,
        };
        t.users.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                password_hash: password_hash.to_owned(),
            },
        );
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let t = self.tables.read().await;
        Ok(t.users.get(&id).map(|r| r.user.clone()))
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let t = self.tables.read().await;
        Ok(t.users
            .values()
            .find(|r| &r.user.email == email)
            .map(|r| r.user.clone()))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let t = self.tables.read().await;
        Ok(t.users
            .values()
            .find(|r| &r.user.email == email)
            .map(|r| (r.user.clone(), r.password_hash.clone())))
    }
}

#[async_trait]
impl SnippetStore for MemoryStore {
    async fn list_snippets_for_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<Snippet>, RepositoryError> {
        let t = self.tables.read().await;
        Ok(t.snippets_where(|r| r.user_id == owner))
    }

    async fn get_snippet(&self, id: SnippetId) -> Result<Option<Snippet>, RepositoryError> {
        let t = self.tables.read().await;
        Ok(t.snippets.get(&id).map(|r| t.to_snippet(r)))
    }

    async fn snippet_owner(&self, id: SnippetId) -> Result<Option<UserId>, RepositoryError> {
        let t = self.tables.read().await;
        Ok(t.snippets.get(&id).map(|r| r.user_id))
    }

    async fn create_snippet(
        &self,
        owner: UserId,
        snippet: &NewSnippet,
    ) -> Result<Snippet, RepositoryError> {
        let mut t = self.tables.write().await;
        if !t.user_exists(owner) {
            return Err(RepositoryError::Conflict("owner does not exist".to_owned()));
        }

        let now = t.tick();
        let record = SnippetRecord {
            id: SnippetId::new(t.next_id()),
            title: snippet.title.clone(),
            content: snippet.content.clone(),
            language: snippet.language.clone(),
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        let id = record.id;
        t.snippets.insert(id, record);
        t.attach_tags(id, &snippet.tags, owner);

        let record = t.snippets.get(&id).ok_or(RepositoryError::NotFound)?;
        Ok(t.to_snippet(record))
    }

    async fn update_snippet(
        &self,
        id: SnippetId,
        actor: UserId,
        changes: &SnippetChanges,
    ) -> Result<Snippet, RepositoryError> {
        let mut t = self.tables.write().await;
        let now = t.tick();
        let record = t.snippets.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        if let Some(title) = &changes.title {
            record.title.clone_from(title);
        }
        if let Some(content) = &changes.content {
            record.content.clone_from(content);
        }
        if let Some(language) = &changes.language {
            record.language.clone_from(language);
        }
        record.updated_at = now;

        if let Some(names) = &changes.tags {
            t.links.retain(|(snippet, _)| *snippet != id);
            t.attach_tags(id, names, actor);
        }

        let record = t.snippets.get(&id).ok_or(RepositoryError::NotFound)?;
        Ok(t.to_snippet(record))
    }

    async fn delete_snippet(&self, id: SnippetId) -> Result<bool, RepositoryError> {
        let mut t = self.tables.write().await;
        if t.snippets.remove(&id).is_none() {
            return Ok(false);
        }
        t.links.retain(|(snippet, _)| *snippet != id);
        Ok(true)
    }

    async fn search_snippets(
        &self,
        owner: UserId,
        query: &str,
    ) -> Result<Vec<Snippet>, RepositoryError> {
        let t = self.tables.read().await;
        let needle = query.to_lowercase();
        Ok(t.snippets_where(|r| {
            r.user_id == owner
                && (r.title.to_lowercase().contains(&needle)
                    || r.content.to_lowercase().contains(&needle)
                    || t.tags_of(r.id)
                        .iter()
                        .any(|tag| tag.name.as_str().to_lowercase().contains(&needle)))
        }))
    }

    async fn list_snippets_with_tag(
        &self,
        owner: UserId,
        tag: TagId,
    ) -> Result<Vec<Snippet>, RepositoryError> {
        let t = self.tables.read().await;
        Ok(t.snippets_where(|r| r.user_id == owner && t.links.contains(&(r.id, tag))))
    }
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn find_or_create_tag(
        &self,
        name: &TagName,
        creator: UserId,
    ) -> Result<Tag, RepositoryError> {
        let mut t = self.tables.write().await;
        Ok(t.upsert_tag(name, creator))
    }

    async fn get_tag_by_name(&self, name: &TagName) -> Result<Option<Tag>, RepositoryError> {
        let t = self.tables.read().await;
        Ok(t.tags.values().find(|tag| &tag.name == name).cloned())
    }

    async fn list_tags_for_owner(&self, owner: UserId) -> Result<Vec<Tag>, RepositoryError> {
        let t = self.tables.read().await;
        let ids: BTreeSet<TagId> = t
            .links
            .iter()
            .filter(|(snippet, _)| t.snippets.get(snippet).is_some_and(|r| r.user_id == owner))
            .map(|(_, tag)| *tag)
            .collect();
        let mut tags: Vec<Tag> = ids.iter().filter_map(|id| t.tags.get(id).cloned()).collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn popular_tags(&self, limit: u32) -> Result<Vec<TagUsage>, RepositoryError> {
        let t = self.tables.read().await;
        let mut usage: Vec<TagUsage> = t
            .tags
            .values()
            .map(|tag| {
                let count = t.links.iter().filter(|(_, id)| *id == tag.id).count();
                TagUsage {
                    id: tag.id,
                    name: tag.name.clone(),
                    count: i64::try_from(count).unwrap_or(i64::MAX),
                }
            })
            .collect();
        usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        usage.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(usage)
    }

    async fn search_tags(&self, query: &str, limit: u32) -> Result<Vec<Tag>, RepositoryError> {
        let t = self.tables.read().await;
        let needle = query.to_lowercase();
        let mut tags: Vec<Tag> = t
            .tags
            .values()
            .filter(|tag| tag.name.as_str().to_lowercase().contains(&needle))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(tags)
    }

    async fn owner_uses_tag(&self, owner: UserId, tag: TagId) -> Result<bool, RepositoryError> {
        let t = self.tables.read().await;
        Ok(t.links.iter().any(|(snippet, id)| {
            *id == tag && t.snippets.get(snippet).is_some_and(|r| r.user_id == owner)
        }))
    }

    async fn rename_tag(&self, id: TagId, name: &TagName) -> Result<Tag, RepositoryError> {
        let mut t = self.tables.write().await;
        if t.tags.values().any(|tag| tag.id != id && &tag.name == name) {
            return Err(RepositoryError::Conflict("tag name already exists".to_owned()));
        }
        let tag = t.tags.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        tag.name = name.clone();
        Ok(tag.clone())
    }

    async fn delete_tag(&self, id: TagId) -> Result<bool, RepositoryError> {
        let mut t = self.tables.write().await;
        if t.tags.remove(&id).is_none() {
            return Ok(false);
        }
        t.links.retain(|(_, tag)| *tag != id);
        Ok(true)
    }

    async fn detach_tag_from_owner(
        &self,
        owner: UserId,
        tag: TagId,
    ) -> Result<u64, RepositoryError> {
        let mut t = self.tables.write().await;
        let owned: Vec<SnippetId> = t
            .links
            .iter()
            .filter(|(snippet, id)| {
                *id == tag && t.snippets.get(snippet).is_some_and(|r| r.user_id == owner)
            })
            .map(|(snippet, _)| *snippet)
            .collect();

        let now = t.tick();
        for snippet in &owned {
            t.links.remove(&(*snippet, tag));
            if let Some(record) = t.snippets.get_mut(snippet) {
                record.updated_at = now;
            }
        }
        Ok(owned.len() as u64)
    }
}
