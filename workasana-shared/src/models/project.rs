/// Project model and database operations
///
/// Projects are named uniquely and remember who created them. Only the
/// creator may change or delete a project; deleting one removes every task
/// filed under it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL UNIQUE,
///     description TEXT,
///     created_by UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    user::{User, UserList},
    NamedRef,
};

const PROJECT_COLUMNS: &str = "id, name, description, created_by, created_at, updated_at";

const DETAILS_SELECT: &str = r#"
    SELECT p.id, p.name, p.description, p.created_at, p.updated_at,
           u.id AS creator_id, u.name AS creator_name
    FROM projects p
    JOIN users u ON u.id = p.created_by
"#;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,

    /// User who created the project
    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub created_by: Uuid,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateProject {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// A project with its creator populated
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetails {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_by: NamedRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ProjectDetailsRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    creator_id: Uuid,
    creator_name: String,
}

impl From<ProjectDetailsRow> for ProjectDetails {
    fn from(row: ProjectDetailsRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            created_by: NamedRef {
                id: row.creator_id,
                name: row.creator_name,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// What a cascading project delete removed
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDeletion {
    pub project_id: Uuid,
    pub deleted_task_ids: Vec<Uuid>,
}

impl Project {
    /// Creates a project and records it in the creator's project list
    ///
    /// Both writes happen in one transaction.
    ///
    /// # Errors
    ///
    /// Returns a unique-violation database error if the name is taken.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let sql = format!(
            "INSERT INTO projects (name, description, created_by) VALUES ($1, $2, $3) RETURNING {}",
            PROJECT_COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(data.name.trim())
            .bind(data.description)
            .bind(data.created_by)
            .fetch_one(&mut *tx)
            .await?;

        User::append_to_list(&mut *tx, project.created_by, UserList::Projects, project.id).await?;

        tx.commit().await?;

        tracing::info!(project_id = %project.id, created_by = %project.created_by, "Created project");

        Ok(project)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);

        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Id of the project with exactly this name
    pub async fn id_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM projects WHERE name = $1")
            .bind(name)
            .fetch_optional(executor)
            .await
    }

    /// Id and name for each of `ids` that exists
    pub async fn names_by_ids<'e, E>(executor: E, ids: &[Uuid]) -> Result<Vec<NamedRef>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, NamedRef>("SELECT id, name FROM projects WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await
    }

    /// Every project with its creator populated, oldest first
    pub async fn list_details(pool: &PgPool) -> Result<Vec<ProjectDetails>, sqlx::Error> {
        let sql = format!("{} ORDER BY p.created_at, p.id", DETAILS_SELECT);

        let rows = sqlx::query_as::<_, ProjectDetailsRow>(&sql)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(ProjectDetails::from).collect())
    }

    /// Populated projects for `ids`, in the order given
    pub async fn find_details_by_ids(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<Vec<ProjectDetails>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{} WHERE p.id = ANY($1) ORDER BY array_position($1, p.id)",
            DETAILS_SELECT
        );

        let rows = sqlx::query_as::<_, ProjectDetailsRow>(&sql)
            .bind(ids)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(ProjectDetails::from).collect())
    }

    /// Applies a partial update, returning `None` if the project doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE projects SET updated_at = NOW()");

        if let Some(name) = data.name {
            query.push(", name = ").push_bind(name.trim().to_string());
        }
        if let Some(description) = data.description {
            query.push(", description = ").push_bind(description);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(PROJECT_COLUMNS);

        query
            .build_query_as::<Project>()
            .fetch_optional(pool)
            .await
    }

    /// Deletes the project together with everything that hangs off it
    ///
    /// In one transaction:
    ///
    /// 1. deletes every task filed under the project
    /// 2. removes those task ids from every user's task list
    /// 3. removes the project id from every user's project list
    /// 4. deletes the project row
    ///
    /// Returns `None` if the project did not exist.
    pub async fn delete_cascade(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ProjectDeletion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted_task_ids = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM tasks WHERE project_id = $1 RETURNING id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        User::remove_from_lists(&mut *tx, UserList::Tasks, &deleted_task_ids).await?;
        User::remove_from_lists(&mut *tx, UserList::Projects, &[id]).await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;

        tracing::info!(
            project_id = %id,
            deleted_tasks = deleted_task_ids.len(),
            "Deleted project"
        );

        Ok(Some(ProjectDeletion {
            project_id: id,
            deleted_task_ids,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_project_is_empty() {
        assert!(UpdateProject::default().is_empty());
        assert!(!UpdateProject {
            description: Some("new".to_string()),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_details_row_populates_creator() {
        let creator_id = Uuid::new_v4();
        let details = ProjectDetails::from(ProjectDetailsRow {
            id: Uuid::new_v4(),
            name: "Website relaunch".to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            creator_id,
            creator_name: "Ada".to_string(),
        });

        assert_eq!(details.created_by.id, creator_id);
        assert_eq!(details.created_by.name, "Ada");
    }
}
