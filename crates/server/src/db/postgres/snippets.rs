//! Snippet queries.
//!
//! List queries fetch snippet rows first, then batch-load tags for the
//! matched ids in a second query.

use async_trait::async_trait;

use reusify_core::{SnippetId, TagId, UserId};

use super::{PgStore, SnippetRow, attach_tags, load_tags, with_tags};
use crate::db::{RepositoryError, SnippetStore, contains_pattern};
use crate::models::{NewSnippet, Snippet, SnippetChanges};

#[async_trait]
impl SnippetStore for PgStore {
    async fn list_snippets_for_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<Snippet>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, SnippetRow>(
            r"
            SELECT id, title, content, language, user_id, created_at, updated_at
            FROM reusify.snippet
            WHERE user_id = $1
            ORDER BY updated_at DESC, id DESC
            ",
        )
        .bind(owner)
        .fetch_all(&mut *conn)
        .await?;

        with_tags(&mut conn, rows).await
    }

    async fn get_snippet(&self, id: SnippetId) -> Result<Option<Snippet>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, SnippetRow>(
            r"
            SELECT id, title, content, language, user_id, created_at, updated_at
            FROM reusify.snippet
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut tags = load_tags(&mut conn, &[row.id]).await?;
        let snippet_tags = tags.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_snippet(snippet_tags)))
    }

    async fn snippet_owner(&self, id: SnippetId) -> Result<Option<UserId>, RepositoryError> {
        let owner = sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM reusify.snippet WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(owner)
    }

    async fn create_snippet(
        &self,
        owner: UserId,
        snippet: &NewSnippet,
    ) -> Result<Snippet, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SnippetRow>(
            r"
            INSERT INTO reusify.snippet (title, content, language, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, language, user_id, created_at, updated_at
            ",
        )
        .bind(&snippet.title)
        .bind(&snippet.content)
        .bind(&snippet.language)
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        attach_tags(&mut tx, row.id, &snippet.tags, owner).await?;
        let mut tags = load_tags(&mut tx, &[row.id]).await?;

        tx.commit().await?;

        let snippet_tags = tags.remove(&row.id).unwrap_or_default();
        Ok(row.into_snippet(snippet_tags))
    }

    async fn update_snippet(
        &self,
        id: SnippetId,
        actor: UserId,
        changes: &SnippetChanges,
    ) -> Result<Snippet, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SnippetRow>(
            r"
            UPDATE reusify.snippet
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                language = COALESCE($4, language),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, content, language, user_id, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.content.as_deref())
        .bind(changes.language.as_deref())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if let Some(names) = &changes.tags {
            sqlx::query("DELETE FROM reusify.snippet_tag WHERE snippet_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            attach_tags(&mut tx, id, names, actor).await?;
        }

        let mut tags = load_tags(&mut tx, &[id]).await?;
        tx.commit().await?;

        let snippet_tags = tags.remove(&id).unwrap_or_default();
        Ok(row.into_snippet(snippet_tags))
    }

    async fn delete_snippet(&self, id: SnippetId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM reusify.snippet WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_snippets(
        &self,
        owner: UserId,
        query: &str,
    ) -> Result<Vec<Snippet>, RepositoryError> {
        let pattern = contains_pattern(query);
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, SnippetRow>(
            r"
            SELECT s.id, s.title, s.content, s.language, s.user_id, s.created_at, s.updated_at
            FROM reusify.snippet s
            WHERE s.user_id = $1
              AND (
                s.title ILIKE $2 ESCAPE '\'
                OR s.content ILIKE $2 ESCAPE '\'
                OR EXISTS (
                    SELECT 1
                    FROM reusify.snippet_tag st
                    JOIN reusify.tag t ON t.id = st.tag_id
                    WHERE st.snippet_id = s.id AND t.name ILIKE $2 ESCAPE '\'
                )
              )
            ORDER BY s.updated_at DESC, s.id DESC
            ",
        )
        .bind(owner)
        .bind(&pattern)
        .fetch_all(&mut *conn)
        .await?;

        with_tags(&mut conn, rows).await
    }

    async fn list_snippets_with_tag(
        &self,
        owner: UserId,
        tag: TagId,
    ) -> Result<Vec<Snippet>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, SnippetRow>(
            r"
            SELECT s.id, s.title, s.content, s.language, s.user_id, s.created_at, s.updated_at
            FROM reusify.snippet s
            JOIN reusify.snippet_tag st ON st.snippet_id = s.id
            WHERE s.user_id = $1 AND st.tag_id = $2
            ORDER BY s.updated_at DESC, s.id DESC
            ",
        )
        .bind(owner)
        .bind(tag)
        .fetch_all(&mut *conn)
        .await?;

        with_tags(&mut conn, rows).await
    }
}
