/// Tag model and database operations
///
/// Tag names are globally unique. Adding a name that already exists hands
/// back the existing tag rather than failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Returns the tag named `name`, creating it first if needed
    ///
    /// A single `INSERT ... ON CONFLICT` statement, so concurrent callers
    /// adding the same name receive the same row. The no-op `DO UPDATE` makes
    /// the conflicting row visible to `RETURNING`.
    pub async fn find_or_create(pool: &PgPool, name: &str) -> Result<Self, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name)
            VALUES ($1)
            ON CONFLICT ON CONSTRAINT tags_name_key DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, created_at
            "#,
        )
        .bind(name.trim())
        .fetch_one(pool)
        .await?;

        tracing::debug!(tag_id = %tag.id, name = %tag.name, "Resolved tag");

        Ok(tag)
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, created_at FROM tags ORDER BY name")
            .fetch_all(pool)
            .await
    }

    /// Distinct tags attached to any task of `project_id`
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT g.id, g.name, g.created_at
            FROM tags g
            WHERE EXISTS (
                SELECT 1 FROM tasks t
                WHERE t.project_id = $1 AND g.id = ANY(t.tags)
            )
            ORDER BY g.name
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Ids of all tags whose name is one of `names`
    pub async fn ids_by_names<'e, E>(executor: E, names: &[String]) -> Result<Vec<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM tags WHERE name = ANY($1)")
            .bind(names)
            .fetch_all(executor)
            .await
    }

    /// Number of distinct ids in `ids` that belong to an existing tag
    pub async fn count_existing<'e, E>(executor: E, ids: &[Uuid]) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(executor)
            .await
    }
}
