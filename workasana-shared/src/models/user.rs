/// User model and database operations
///
/// A user owns three id lists that mirror what they created or were assigned:
/// `task_ids`, `project_ids` and `team_ids`. The lists are appended to inside
/// the transaction that creates the referenced entity and pruned when it is
/// deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     task_ids UUID[] NOT NULL DEFAULT '{}',
///     project_ids UUID[] NOT NULL DEFAULT '{}',
///     team_ids UUID[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use workasana_shared::models::user::{User, UserList};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid, task_id: Uuid) -> Result<(), sqlx::Error> {
/// let mut tx = pool.begin().await?;
/// User::append_to_list(&mut *tx, user_id, UserList::Tasks, task_id).await?;
/// tx.commit().await?;
///
/// let found = User::find_by_email(&pool, "ada@example.com").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::{project::ProjectDetails, task::TaskDetails, team::TeamDetails};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, task_ids, project_ids, team_ids, created_at, updated_at";

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Display name, also the key the task filter resolves `owner` against
    pub name: String,

    /// Unique email address
    pub email: String,

    /// Argon2id password hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub task_ids: Vec<Uuid>,
    pub project_ids: Vec<Uuid>,
    pub team_ids: Vec<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

/// One of the id lists carried on a user row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserList {
    Tasks,
    Projects,
    Teams,
}

impl UserList {
    pub fn column(&self) -> &'static str {
        match self {
            UserList::Tasks => "task_ids",
            UserList::Projects => "project_ids",
            UserList::Teams => "team_ids",
        }
    }
}

/// A user with its task, project and team lists populated
#[derive(Debug, Clone, Serialize)]
pub struct UserDetails {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub tasks: Vec<TaskDetails>,
    pub projects: Vec<ProjectDetails>,
    pub teams: Vec<TeamDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns a unique-violation database error if the email is taken.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(data.name)
            .bind(data.email)
            .bind(data.password_hash)
            .fetch_one(pool)
            .await?;

        tracing::info!(user_id = %user.id, "Created user");

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Lists every user, oldest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at, id", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql).fetch_all(pool).await
    }

    /// Ids of all users whose name is one of `names`
    pub async fn ids_by_names<'e, E>(executor: E, names: &[String]) -> Result<Vec<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE name = ANY($1)")
            .bind(names)
            .fetch_all(executor)
            .await
    }

    /// Number of distinct ids in `ids` that belong to an existing user
    pub async fn count_existing<'e, E>(executor: E, ids: &[Uuid]) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(executor)
            .await
    }

    /// Appends `id` to one of the user's lists unless already present
    pub async fn append_to_list<'e, E>(
        executor: E,
        user_id: Uuid,
        list: UserList,
        id: Uuid,
    ) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let column = list.column();
        let sql = format!(
            "UPDATE users SET {column} = array_append({column}, $2), updated_at = NOW() \
             WHERE id = $1 AND NOT ($2 = ANY({column}))"
        );

        sqlx::query(&sql)
            .bind(user_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Removes each of `ids` from the given list of every user holding it
    ///
    /// Returns the number of user rows touched.
    pub async fn remove_from_lists<'e, E>(
        executor: E,
        list: UserList,
        ids: &[Uuid],
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if ids.is_empty() {
            return Ok(0);
        }

        let column = list.column();
        let sql = format!(
            "UPDATE users \
             SET {column} = ARRAY(SELECT x FROM unnest({column}) AS x WHERE NOT (x = ANY($1))), \
                 updated_at = NOW() \
             WHERE {column} && $1"
        );

        let result = sqlx::query(&sql).bind(ids).execute(executor).await?;

        Ok(result.rows_affected())
    }

    /// Loads the user's populated tasks, projects and teams
    pub async fn details(self, pool: &PgPool) -> Result<UserDetails, sqlx::Error> {
        let tasks = super::task::Task::find_details_by_ids(pool, &self.task_ids).await?;
        let projects = super::project::Project::find_details_by_ids(pool, &self.project_ids).await?;
        let teams = super::team::Team::find_details_by_ids(pool, &self.team_ids).await?;

        Ok(UserDetails {
            id: self.id,
            name: self.name,
            email: self.email,
            tasks,
            projects,
            teams,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
