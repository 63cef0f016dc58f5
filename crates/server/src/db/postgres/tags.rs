//! Tag queries.

use async_trait::async_trait;

use reusify_core::{TagId, TagName, UserId};

use super::{PgStore, TagRow, TagUsageRow, conflict_on_unique, upsert_tag};
use crate::db::{RepositoryError, TagStore, contains_pattern};
use crate::models::{Tag, TagUsage};

#[async_trait]
impl TagStore for PgStore {
    async fn find_or_create_tag(
        &self,
        name: &TagName,
        creator: UserId,
    ) -> Result<Tag, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        upsert_tag(&mut conn, name, creator).await
    }

    async fn get_tag_by_name(&self, name: &TagName) -> Result<Option<Tag>, RepositoryError> {
        sqlx::query_as::<_, TagRow>(
            "SELECT id, name, user_id, created_at FROM reusify.tag WHERE name = $1",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(Tag::try_from)
        .transpose()
    }

    async fn list_tags_for_owner(&self, owner: UserId) -> Result<Vec<Tag>, RepositoryError> {
        let rows = sqlx::query_as::<_, TagRow>(
            r"
            SELECT DISTINCT t.id, t.name, t.user_id, t.created_at
            FROM reusify.tag t
            JOIN reusify.snippet_tag st ON st.tag_id = t.id
            JOIN reusify.snippet s ON s.id = st.snippet_id
            WHERE s.user_id = $1
            ORDER BY t.name
            ",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Tag::try_from).collect()
    }

    async fn popular_tags(&self, limit: u32) -> Result<Vec<TagUsage>, RepositoryError> {
        let rows = sqlx::query_as::<_, TagUsageRow>(
            r"
            SELECT t.id, t.name, COUNT(st.snippet_id) AS count
            FROM reusify.tag t
            LEFT JOIN reusify.snippet_tag st ON st.tag_id = t.id
            GROUP BY t.id, t.name
            ORDER BY count DESC, t.name ASC
            LIMIT $1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TagUsage::try_from).collect()
    }

    async fn search_tags(&self, query: &str, limit: u32) -> Result<Vec<Tag>, RepositoryError> {
        let rows = sqlx::query_as::<_, TagRow>(
            r"
            SELECT id, name, user_id, created_at
            FROM reusify.tag
            WHERE name ILIKE $1 ESCAPE '\'
            ORDER BY name
            LIMIT $2
            ",
        )
        .bind(contains_pattern(query))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Tag::try_from).collect()
    }

    async fn owner_uses_tag(&self, owner: UserId, tag: TagId) -> Result<bool, RepositoryError> {
        let used = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1
                FROM reusify.snippet_tag st
                JOIN reusify.snippet s ON s.id = st.snippet_id
                WHERE s.user_id = $1 AND st.tag_id = $2
            )
            ",
        )
        .bind(owner)
        .bind(tag)
        .fetch_one(&self.pool)
        .await?;
        Ok(used)
    }

    async fn rename_tag(&self, id: TagId, name: &TagName) -> Result<Tag, RepositoryError> {
        let row = sqlx::query_as::<_, TagRow>(
            r"
            UPDATE reusify.tag
            SET name = $2
            WHERE id = $1
            RETURNING id, name, user_id, created_at
            ",
        )
        .bind(id)
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_on_unique("tag name already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Tag::try_from(row)
    }

    async fn delete_tag(&self, id: TagId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM reusify.tag WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn detach_tag_from_owner(
        &self,
        owner: UserId,
        tag: TagId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            WITH detached AS (
                DELETE FROM reusify.snippet_tag st
                USING reusify.snippet s
                WHERE st.snippet_id = s.id AND s.user_id = $1 AND st.tag_id = $2
                RETURNING st.snippet_id
            )
            UPDATE reusify.snippet
            SET updated_at = NOW()
            WHERE id IN (SELECT snippet_id FROM detached)
            ",
        )
        .bind(owner)
        .bind(tag)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
