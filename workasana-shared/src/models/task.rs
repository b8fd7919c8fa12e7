/// Task model and database operations
///
/// Every task belongs to exactly one project and one team, has at least one
/// owner (its creator) and any number of tags. Only owners may update or
/// delete a task.
///
/// # Statuses
///
/// ```text
/// To Do | In Progress | Blocked   pending work, counted by the pending report
/// Completed                       counted by the last-week report
/// Closed                          grouped by the closed-tasks report
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM (
///     'To Do', 'In Progress', 'Completed', 'Blocked', 'Closed'
/// );
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     project_id UUID NOT NULL REFERENCES projects(id),
///     team_id UUID NOT NULL REFERENCES teams(id),
///     created_by UUID NOT NULL REFERENCES users(id),
///     owners UUID[] NOT NULL DEFAULT '{}',
///     tags UUID[] NOT NULL DEFAULT '{}',
///     time_to_complete INTEGER NOT NULL CHECK (time_to_complete >= 0),
///     status task_status NOT NULL DEFAULT 'To Do',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use workasana_shared::models::task::{owner_list, CreateTask, Task, TaskStatus};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, creator: Uuid, project: Uuid, team: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     name: "Draft launch email".to_string(),
///     project_id: project,
///     team_id: team,
///     created_by: creator,
///     owners: owner_list(creator, &[]),
///     tags: vec![],
///     time_to_complete: 4,
///     status: TaskStatus::ToDo,
/// })
/// .await?;
///
/// let populated = Task::find_details(&pool, task.id).await?;
/// # Ok(())
/// # }
/// ```

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{
    postgres::{PgHasArrayType, PgTypeInfo},
    types::Json,
    PgPool, Postgres, QueryBuilder,
};
use uuid::Uuid;

use super::{
    dedup_ids,
    user::{User, UserList},
    NamedRef, UserRef,
};

pub(crate) const TASK_COLUMNS: &str =
    "id, name, project_id, team_id, created_by, owners, tags, time_to_complete, status, created_at, updated_at";

/// Populated task projection; callers append `WHERE` / `ORDER BY`
pub(crate) const DETAILS_SELECT: &str = r#"
    SELECT t.id, t.name, t.time_to_complete, t.status, t.created_at, t.updated_at,
           p.id AS project_id, p.name AS project_name,
           tm.id AS team_id, tm.name AS team_name,
           COALESCE((
               SELECT json_agg(json_build_object('id', u.id, 'name', u.name, 'email', u.email)
                               ORDER BY array_position(t.owners, u.id))
               FROM users u
               WHERE u.id = ANY(t.owners)
           ), '[]'::json) AS owners,
           COALESCE((
               SELECT json_agg(json_build_object('id', g.id, 'name', g.name)
                               ORDER BY array_position(t.tags, g.id))
               FROM tags g
               WHERE g.id = ANY(t.tags)
           ), '[]'::json) AS tags
    FROM tasks t
    JOIN projects p ON p.id = t.project_id
    JOIN teams tm ON tm.id = t.team_id
"#;

/// Task status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    #[default]
    #[sqlx(rename = "To Do")]
    #[serde(rename = "To Do")]
    ToDo,

    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,

    Completed,

    Blocked,

    Closed,
}

impl PgHasArrayType for TaskStatus {
    fn array_type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("_task_status")
    }
}

/// Error returned when a string is not one of the task statuses
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status '{0}', expected one of: To Do, In Progress, Completed, Blocked, Closed")]
pub struct ParseStatusError(pub String);

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Blocked,
        TaskStatus::Closed,
    ];

    /// Statuses whose remaining time counts as pending work
    pub const PENDING: [TaskStatus; 3] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == trimmed)
            .ok_or_else(|| ParseStatusError(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub project_id: Uuid,
    pub team_id: Uuid,

    /// User who created the task; always the first owner
    pub created_by: Uuid,

    /// Owner user ids; the creator is always first
    pub owners: Vec<Uuid>,

    pub tags: Vec<Uuid>,

    /// Estimated remaining effort
    pub time_to_complete: i32,

    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTask {
    pub name: String,
    pub project_id: Uuid,
    pub team_id: Uuid,

    /// Creator; receives the task in their task list
    pub created_by: Uuid,

    /// Full owner list as produced by [`owner_list`]
    pub owners: Vec<Uuid>,

    pub tags: Vec<Uuid>,
    pub time_to_complete: i32,
    pub status: TaskStatus,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub project_id: Option<Uuid>,
    pub team_id: Option<Uuid>,

    /// Replacement owners; the creator is put back in front if missing
    pub owners: Option<Vec<Uuid>>,
    pub tags: Option<Vec<Uuid>>,
    pub time_to_complete: Option<i32>,
    pub status: Option<TaskStatus>,
}

/// A task with project, team, owners and tags populated
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetails {
    pub id: Uuid,
    pub name: String,
    pub project: NamedRef,
    pub team: NamedRef,
    pub owners: Vec<UserRef>,
    pub tags: Vec<NamedRef>,
    pub time_to_complete: i32,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
pub(crate) struct TaskDetailsRow {
    id: Uuid,
    name: String,
    time_to_complete: i32,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    project_id: Uuid,
    project_name: String,
    team_id: Uuid,
    team_name: String,
    owners: Json<Vec<UserRef>>,
    tags: Json<Vec<NamedRef>>,
}

impl From<TaskDetailsRow> for TaskDetails {
    fn from(row: TaskDetailsRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            project: NamedRef {
                id: row.project_id,
                name: row.project_name,
            },
            team: NamedRef {
                id: row.team_id,
                name: row.team_name,
            },
            owners: row.owners.0,
            tags: row.tags.0,
            time_to_complete: row.time_to_complete,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Owner list for a new task: the creator followed by `others`, without duplicates
pub fn owner_list(creator: Uuid, others: &[Uuid]) -> Vec<Uuid> {
    dedup_ids(std::iter::once(creator).chain(others.iter().copied()))
}

impl Task {
    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owners.contains(&user_id)
    }

    /// Creates a task and records it in the creator's task list
    ///
    /// # Errors
    ///
    /// Returns a foreign-key database error if the project or team is unknown.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO tasks (name, project_id, team_id, created_by, owners, tags, time_to_complete, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(data.name.trim())
            .bind(data.project_id)
            .bind(data.team_id)
            .bind(data.created_by)
            .bind(&data.owners)
            .bind(&data.tags)
            .bind(data.time_to_complete)
            .bind(data.status)
            .fetch_one(&mut *tx)
            .await?;

        User::append_to_list(&mut *tx, data.created_by, UserList::Tasks, task.id).await?;

        tx.commit().await?;

        tracing::info!(
            task_id = %task.id,
            project_id = %task.project_id,
            owners = task.owners.len(),
            "Created task"
        );

        Ok(task)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_details(pool: &PgPool, id: Uuid) -> Result<Option<TaskDetails>, sqlx::Error> {
        let sql = format!("{} WHERE t.id = $1", DETAILS_SELECT);

        let row = sqlx::query_as::<_, TaskDetailsRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(TaskDetails::from))
    }

    /// Every task, populated, oldest first
    pub async fn list_details(pool: &PgPool) -> Result<Vec<TaskDetails>, sqlx::Error> {
        let sql = format!("{} ORDER BY t.created_at, t.id", DETAILS_SELECT);

        let rows = sqlx::query_as::<_, TaskDetailsRow>(&sql).fetch_all(pool).await?;

        Ok(rows.into_iter().map(TaskDetails::from).collect())
    }

    /// Populated tasks that list `user_id` among their owners
    pub async fn list_details_by_owner(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TaskDetails>, sqlx::Error> {
        let sql = format!(
            "{} WHERE $1 = ANY(t.owners) ORDER BY t.created_at, t.id",
            DETAILS_SELECT
        );

        let rows = sqlx::query_as::<_, TaskDetailsRow>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(TaskDetails::from).collect())
    }

    /// Populated tasks for `ids`, in the order given
    pub async fn find_details_by_ids(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<Vec<TaskDetails>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{} WHERE t.id = ANY($1) ORDER BY array_position($1, t.id)",
            DETAILS_SELECT
        );

        let rows = sqlx::query_as::<_, TaskDetailsRow>(&sql)
            .bind(ids)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(TaskDetails::from).collect())
    }

    /// Applies a partial update and refreshes `updated_at`
    ///
    /// A replacement owner list always keeps the creator as its first entry.
    /// Returns `None` if the task doesn't exist.
    pub async fn update(pool: &PgPool, id: Uuid, data: UpdateTask) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(name) = data.name {
            query.push(", name = ").push_bind(name.trim().to_string());
        }
        if let Some(project_id) = data.project_id {
            query.push(", project_id = ").push_bind(project_id);
        }
        if let Some(team_id) = data.team_id {
            query.push(", team_id = ").push_bind(team_id);
        }
        if let Some(owners) = data.owners {
            query
                .push(", owners = array_prepend(created_by, array_remove(")
                .push_bind(owners)
                .push("::uuid[], created_by))");
        }
        if let Some(tags) = data.tags {
            query.push(", tags = ").push_bind(tags);
        }
        if let Some(time_to_complete) = data.time_to_complete {
            query.push(", time_to_complete = ").push_bind(time_to_complete);
        }
        if let Some(status) = data.status {
            query.push(", status = ").push_bind(status);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(TASK_COLUMNS);

        let task = query.build_query_as::<Task>().fetch_optional(pool).await?;

        if let Some(task) = &task {
            tracing::debug!(task_id = %task.id, status = %task.status, "Updated task");
        }

        Ok(task)
    }

    /// Deletes the task and removes it from every user's task list
    ///
    /// Returns `true` if a task was deleted.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        User::remove_from_lists(&mut *tx, UserList::Tasks, &[id]).await?;

        tx.commit().await?;

        tracing::info!(task_id = %id, "Deleted task");

        Ok(true)
    }
}
