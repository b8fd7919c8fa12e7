/// Resource-level authorization checks
///
/// Ownership rules:
///
/// 1. A **task** may be updated or deleted only by one of its owners
/// 2. A **team** may be updated only by one of its members
/// 3. A **project** may be updated or deleted only by its creator
///
/// The checks take already-loaded entities, so callers decide how a missing
/// resource is reported (usually 404) before asking whether the caller may
/// touch it (403).
///
/// # Example
///
/// ```no_run
/// use workasana_shared::auth::authorization::require_task_owner;
/// use workasana_shared::models::task::Task;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, task_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// if let Some(task) = Task::find_by_id(&pool, task_id).await? {
///     require_task_owner(&task, user_id)?;
/// }
/// # Ok(())
/// # }
/// ```

use uuid::Uuid;

use crate::models::{project::Project, task::Task, team::Team};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthzError {
    /// Caller is not among the task's owners
    #[error("Only an owner of task {0} may modify it")]
    NotOwner(Uuid),

    /// Caller is not a member of the team
    #[error("Only a member of team {0} may modify it")]
    NotMember(Uuid),

    /// Caller did not create the project
    #[error("Only the creator of project {0} may modify it")]
    NotCreator(Uuid),
}

pub fn require_task_owner(task: &Task, user_id: Uuid) -> Result<(), AuthzError> {
    if task.is_owner(user_id) {
        Ok(())
    } else {
        Err(AuthzError::NotOwner(task.id))
    }
}

pub fn require_team_member(team: &Team, user_id: Uuid) -> Result<(), AuthzError> {
    if team.is_member(user_id) {
        Ok(())
    } else {
        Err(AuthzError::NotMember(team.id))
    }
}

pub fn require_project_creator(project: &Project, user_id: Uuid) -> Result<(), AuthzError> {
    if project.created_by == user_id {
        Ok(())
    } else {
        Err(AuthzError::NotCreator(project.id))
    }
}
