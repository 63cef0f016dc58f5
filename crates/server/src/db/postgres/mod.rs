//! `PostgreSQL` adapter for the [`Store`](super::Store) port.
//!
//! Queries are built at runtime with `sqlx::query_as` and mapped through
//! `FromRow` row structs, then validated into domain types. Values that fail
//! validation surface as [`RepositoryError::DataCorruption`].

mod snippets;
mod tags;
mod users;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use reusify_core::{DisplayName, Email, SnippetId, TagId, TagName, UserId};

use super::{RepositoryError, Store};
use crate::models::{Snippet, Tag, TagUsage, User};

/// Store backed by a shared `PgPool`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for the session store and migrations.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let name = DisplayName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid user name in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name,
            email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TagRow {
    id: TagId,
    name: String,
    user_id: Option<UserId>,
    created_at: DateTime<Utc>,
}

fn parse_tag_name(name: &str) -> Result<TagName, RepositoryError> {
    TagName::parse(name)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid tag name in database: {e}")))
}

impl TryFrom<TagRow> for Tag {
    type Error = RepositoryError;

    fn try_from(row: TagRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: parse_tag_name(&row.name)?,
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TagUsageRow {
    id: TagId,
    name: String,
    count: i64,
}

impl TryFrom<TagUsageRow> for TagUsage {
    type Error = RepositoryError;

    fn try_from(row: TagUsageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: parse_tag_name(&row.name)?,
            count: row.count,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SnippetTagRow {
    snippet_id: SnippetId,
    #[sqlx(flatten)]
    tag: TagRow,
}

#[derive(sqlx::FromRow)]
struct SnippetRow {
    id: SnippetId,
    title: String,
    content: String,
    language: String,
    user_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SnippetRow {
    fn into_snippet(self, tags: Vec<Tag>) -> Snippet {
        Snippet {
            id: self.id,
            title: self.title,
            content: self.content,
            language: self.language,
            user_id: self.user_id,
            tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Map a unique violation to [`RepositoryError::Conflict`].
fn conflict_on_unique(message: &'static str) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict(message.to_owned());
        }
        RepositoryError::Database(e)
    }
}

/// Load the tags of every snippet in `ids`, each list ordered by name.
async fn load_tags(
    conn: &mut PgConnection,
    ids: &[SnippetId],
) -> Result<HashMap<SnippetId, Vec<Tag>>, RepositoryError> {
    let mut by_snippet: HashMap<SnippetId, Vec<Tag>> = HashMap::new();
    if ids.is_empty() {
        return Ok(by_snippet);
    }

    let raw_ids: Vec<i32> = ids.iter().map(SnippetId::as_i32).collect();
    let rows = sqlx::query_as::<_, SnippetTagRow>(
        r"
        SELECT st.snippet_id, t.id, t.name, t.user_id, t.created_at
        FROM reusify.snippet_tag st
        JOIN reusify.tag t ON t.id = st.tag_id
        WHERE st.snippet_id = ANY($1)
        ORDER BY t.name
        ",
    )
    .bind(&raw_ids)
    .fetch_all(&mut *conn)
    .await?;

    for row in rows {
        by_snippet
            .entry(row.snippet_id)
            .or_default()
            .push(Tag::try_from(row.tag)?);
    }
    Ok(by_snippet)
}

/// Attach tags to a batch of snippet rows, preserving row order.
async fn with_tags(
    conn: &mut PgConnection,
    rows: Vec<SnippetRow>,
) -> Result<Vec<Snippet>, RepositoryError> {
    let ids: Vec<SnippetId> = rows.iter().map(|r| r.id).collect();
    let mut tags = load_tags(conn, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let snippet_tags = tags.remove(&row.id).unwrap_or_default();
            row.into_snippet(snippet_tags)
        })
        .collect())
}

/// Find a tag by name or create it, in one statement.
async fn upsert_tag(
    conn: &mut PgConnection,
    name: &TagName,
    creator: UserId,
) -> Result<Tag, RepositoryError> {
    let row = sqlx::query_as::<_, TagRow>(
        r"
        INSERT INTO reusify.tag (name, user_id)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id, name, user_id, created_at
        ",
    )
    .bind(name.as_str())
    .bind(creator)
    .fetch_one(&mut *conn)
    .await?;

    Tag::try_from(row)
}

/// Resolve `names` by find-or-create and link each to `snippet`.
async fn attach_tags(
    conn: &mut PgConnection,
    snippet: SnippetId,
    names: &[TagName],
    creator: UserId,
) -> Result<(), RepositoryError> {
    // Upserts lock tag rows until commit; taking them in name order keeps
    // concurrent writers from deadlocking on each other.
    let mut ordered: Vec<&TagName> = names.iter().collect();
    ordered.sort();

    for name in ordered {
        let tag = upsert_tag(conn, name, creator).await?;
        sqlx::query(
            r"
            INSERT INTO reusify.snippet_tag (snippet_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(snippet)
        .bind(tag.id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
