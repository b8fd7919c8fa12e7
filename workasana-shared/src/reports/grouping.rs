/// Closed-task grouping
///
/// Counts closed tasks per team, project or owner. Owner grouping fans out:
/// a task with three owners adds one to each of three groups, so the counts
/// sum to the total number of owner slots rather than the number of tasks.
///
/// Group ids are resolved to names per dimension: teams and projects through
/// the [`Directory`], owners from the names loaded alongside each task.
/// Ids that no longer resolve are reported as [`UNKNOWN_GROUP`].

use std::{collections::HashMap, str::FromStr};

use serde::Serialize;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::models::UserRef;
use crate::query::{directory::Directory, QueryError};

/// Name reported for a group whose id doesn't resolve
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Dimension to group closed tasks by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Team,
    Owner,
    Project,
}

impl GroupBy {
    /// Task field the grouping reads, as reported in `groupByField`
    pub fn field(&self) -> &'static str {
        match self {
            GroupBy::Team => "team",
            GroupBy::Owner => "owners",
            GroupBy::Project => "project",
        }
    }
}

impl FromStr for GroupBy {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "team" => Ok(GroupBy::Team),
            "owner" => Ok(GroupBy::Owner),
            "project" => Ok(GroupBy::Project),
            other => Err(QueryError::InvalidArgument(format!(
                "Invalid groupBy '{}', expected one of: team, owner, project",
                other
            ))),
        }
    }
}

/// The slice of a closed task the grouping needs
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClosedTask {
    pub id: Uuid,
    pub team_id: Uuid,
    pub project_id: Uuid,
    pub owners: Vec<Uuid>,

    /// Owners that still exist, with their names
    pub owner_refs: Json<Vec<UserRef>>,
}

/// One row of the closed-task report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    pub group: Uuid,
    pub group_name: String,
    pub group_by_field: &'static str,
    pub task_count: u64,
}

/// Loads every task whose status is "closed", compared case-insensitively
pub async fn load_closed_tasks(pool: &PgPool) -> Result<Vec<ClosedTask>, sqlx::Error> {
    sqlx::query_as::<_, ClosedTask>(
        r#"
        SELECT t.id, t.team_id, t.project_id, t.owners,
               COALESCE((
                   SELECT json_agg(json_build_object('id', u.id, 'name', u.name, 'email', u.email))
                   FROM users u
                   WHERE u.id = ANY(t.owners)
               ), '[]'::json) AS owner_refs
        FROM tasks t
        WHERE lower(t.status::text) = 'closed'
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Task count per group key
pub fn count_by(tasks: &[ClosedTask], group_by: GroupBy) -> HashMap<Uuid, u64> {
    let mut counts = HashMap::new();

    for task in tasks {
        match group_by {
            GroupBy::Team => *counts.entry(task.team_id).or_insert(0) += 1,
            GroupBy::Project => *counts.entry(task.project_id).or_insert(0) += 1,
            GroupBy::Owner => {
                for owner in &task.owners {
                    *counts.entry(*owner).or_insert(0) += 1;
                }
            }
        }
    }

    counts
}

/// Groups `tasks` and names each group
///
/// Sorted by descending count, ties broken by group id.
pub async fn group_closed_tasks<D>(
    tasks: &[ClosedTask],
    group_by: GroupBy,
    directory: &D,
) -> Result<Vec<GroupCount>, sqlx::Error>
where
    D: Directory + ?Sized,
{
    let counts = count_by(tasks, group_by);
    let ids: Vec<Uuid> = counts.keys().copied().collect();

    let names: HashMap<Uuid, String> = match group_by {
        GroupBy::Team => directory.team_names(&ids).await?,
        GroupBy::Project => directory.project_names(&ids).await?,
        GroupBy::Owner => tasks
            .iter()
            .flat_map(|task| task.owner_refs.0.iter())
            .map(|owner| (owner.id, owner.name.clone()))
            .collect(),
    };

    let mut groups: Vec<GroupCount> = counts
        .into_iter()
        .map(|(id, task_count)| GroupCount {
            group: id,
            group_name: names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_GROUP.to_string()),
            group_by_field: group_by.field(),
            task_count,
        })
        .collect();

    groups.sort_by(|a, b| {
        b.task_count
            .cmp(&a.task_count)
            .then_with(|| a.group.cmp(&b.group))
    });

    Ok(groups)
}
