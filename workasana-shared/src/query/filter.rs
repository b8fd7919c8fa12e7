/// Task filter construction
///
/// # Parameters
///
/// | key       | values                      | predicate                        |
/// |-----------|-----------------------------|----------------------------------|
/// | `team`    | one team name               | `team_id = id`                   |
/// | `owner`   | user names                  | any owner among the matched ids  |
/// | `tags`    | tag names                   | task carries every named tag     |
/// | `project` | one project name            | `project_id = id`                |
/// | `status`  | status values               | status is any of the values      |
///
/// Multi-valued keys accept comma-separated values and may be repeated
/// (`owner=Ada&owner=Grace` is the same as `owner=Ada,Grace`). Omitted keys
/// impose no constraint; all given keys must hold.
///
/// # Example
///
/// ```
/// use workasana_shared::query::filter::TaskQuery;
///
/// let query = TaskQuery::from_pairs([
///     ("owner", "Ada, Grace"),
///     ("owner", "Linus"),
///     ("status", "To Do"),
/// ]);
///
/// assert_eq!(query.owner.as_deref().map(|o| o.len()), Some(3));
/// assert!(query.team.is_none());
/// ```

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{directory::Directory, QueryError};
use crate::models::task::{TaskDetails, TaskDetailsRow, TaskStatus, DETAILS_SELECT};

/// Raw, unresolved task query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub team: Option<String>,
    pub owner: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub project: Option<String>,
    pub status: Option<Vec<String>>,
}

impl TaskQuery {
    /// Builds a query from decoded query-string pairs
    ///
    /// Values are trimmed and empty values dropped. For `team` and `project`
    /// the last non-empty value wins. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = TaskQuery::default();

        for (key, value) in pairs {
            let value = value.as_ref();

            match key.as_ref() {
                "team" => set_single(&mut query.team, value),
                "project" => set_single(&mut query.project, value),
                "owner" => extend_list(&mut query.owner, value),
                "tags" => extend_list(&mut query.tags, value),
                "status" => extend_list(&mut query.status, value),
                _ => {}
            }
        }

        query
    }

    pub fn is_empty(&self) -> bool {
        self.team.is_none()
            && self.owner.is_none()
            && self.tags.is_none()
            && self.project.is_none()
            && self.status.is_none()
    }
}

fn set_single(slot: &mut Option<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        *slot = Some(value.to_string());
    }
}

fn extend_list(slot: &mut Option<Vec<String>>, value: &str) {
    let parts = value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string);

    for part in parts {
        let list = slot.get_or_insert_with(Vec::new);
        if !list.contains(&part) {
            list.push(part);
        }
    }
}

/// Parses every status value, failing on the first unknown one
pub fn parse_statuses(values: &[String]) -> Result<Vec<TaskStatus>, QueryError> {
    let mut statuses = Vec::with_capacity(values.len());

    for value in values {
        let status = value
            .parse::<TaskStatus>()
            .map_err(|e| QueryError::InvalidArgument(e.to_string()))?;
        if !statuses.contains(&status) {
            statuses.push(status);
        }
    }

    Ok(statuses)
}

/// A resolved task filter: every name replaced by ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub team_id: Option<Uuid>,

    /// Matches tasks with at least one of these owners
    pub owner_ids: Option<Vec<Uuid>>,

    /// Matches tasks carrying all of these tags
    pub tag_ids: Option<Vec<Uuid>>,

    pub project_id: Option<Uuid>,

    /// Matches tasks in any of these statuses
    pub statuses: Option<Vec<TaskStatus>>,
}

impl TaskFilter {
    /// Resolves a raw query into ids
    ///
    /// Status values are validated before any lookup runs. The first failing
    /// parameter aborts resolution.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if a status value is unknown
    /// - `NotFound` if the team or project doesn't exist, no user matches the
    ///   given names, or any tag name is unknown
    pub async fn resolve<D>(query: &TaskQuery, directory: &D) -> Result<Self, QueryError>
    where
        D: Directory + ?Sized,
    {
        let statuses = query.status.as_deref().map(parse_statuses).transpose()?;

        let mut filter = TaskFilter {
            statuses,
            ..Default::default()
        };

        if let Some(name) = &query.team {
            let id = directory
                .team_id(name.trim())
                .await?
                .ok_or_else(|| QueryError::NotFound(format!("Team '{}' not found", name)))?;
            filter.team_id = Some(id);
        }

        if let Some(names) = &query.owner {
            let ids = directory.user_ids(names).await?;
            if ids.is_empty() {
                return Err(QueryError::NotFound(format!(
                    "No users found matching: {}",
                    names.join(", ")
                )));
            }
            filter.owner_ids = Some(ids);
        }

        if let Some(names) = &query.tags {
            // Every named tag must be carried, so one unknown name matches nothing.
            let ids = directory.tag_ids(names).await?;
            if ids.len() < names.len() {
                return Err(QueryError::NotFound(format!(
                    "Tags not found among: {}",
                    names.join(", ")
                )));
            }
            filter.tag_ids = Some(ids);
        }

        if let Some(name) = &query.project {
            let id = directory
                .project_id(name.trim())
                .await?
                .ok_or_else(|| QueryError::NotFound(format!("Project '{}' not found", name)))?;
            filter.project_id = Some(id);
        }

        tracing::debug!(?filter, "Resolved task filter");

        Ok(filter)
    }

    /// Appends ` WHERE ...` for the set predicates (nothing if none are set)
    ///
    /// Expects the builder to select from `tasks t`.
    pub fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        let mut has_clause = false;
        let mut next_clause = |query: &mut QueryBuilder<'_, Postgres>| {
            query.push(if has_clause { " AND " } else { " WHERE " });
            has_clause = true;
        };

        if let Some(team_id) = self.team_id {
            next_clause(query);
            query.push("t.team_id = ").push_bind(team_id);
        }

        if let Some(owner_ids) = &self.owner_ids {
            next_clause(query);
            query.push("t.owners && ").push_bind(owner_ids.clone());
        }

        if let Some(tag_ids) = &self.tag_ids {
            next_clause(query);
            query.push("t.tags @> ").push_bind(tag_ids.clone());
        }

        if let Some(project_id) = self.project_id {
            next_clause(query);
            query.push("t.project_id = ").push_bind(project_id);
        }

        if let Some(statuses) = &self.statuses {
            next_clause(query);
            query.push("t.status = ANY(").push_bind(statuses.clone()).push(")");
        }
    }

    /// Populated tasks matching the filter, oldest first
    pub async fn fetch(&self, pool: &PgPool) -> Result<Vec<TaskDetails>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new(DETAILS_SELECT);
        self.push_conditions(&mut query);
        query.push(" ORDER BY t.created_at, t.id");

        let rows = query
            .build_query_as::<TaskDetailsRow>()
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(TaskDetails::from).collect())
    }
}
