/// Database models
///
/// Each model owns its table and exposes associated functions for the
/// queries run against it. Functions that take part in multi-statement
/// writes are generic over [`sqlx::PgExecutor`] so they accept either the
/// pool or an open transaction.
///
/// # Models
///
/// - `user`: accounts plus the user's task/project/team id lists
/// - `project`: projects and the cascading delete
/// - `team`: teams and their ordered member lists
/// - `tag`: globally unique tags
/// - `task`: tasks, their status enum and populated views
///
/// # Example
///
/// ```no_run
/// use workasana_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     name: "Ada Lovelace".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod project;
pub mod tag;
pub mod task;
pub mod team;
pub mod user;

/// A referenced entity reduced to its id and display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

/// A referenced user reduced to the fields shown next to tasks and teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Removes duplicate ids while keeping first-seen order
pub fn dedup_ids(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
