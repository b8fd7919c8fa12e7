/// Task queries by display name
///
/// Callers describe tasks by names (team, owners, tags, project) and status
/// values. A [`filter::TaskQuery`] holds the raw, optional parameters; it is
/// resolved against a [`directory::Directory`] into a
/// [`filter::TaskFilter`] of ids, which renders itself as SQL.
///
/// ```text
/// ?team=Platform&owner=Ada,Grace&status=Closed
///        │
///        ▼  TaskQuery::from_pairs
/// TaskQuery { team, owner, tags, project, status }
///        │
///        ▼  TaskFilter::resolve (status checked first, then name lookups)
/// TaskFilter { team_id, owner_ids, tag_ids, project_id, statuses }
///        │
///        ▼  TaskFilter::fetch
/// Vec<TaskDetails>
/// ```

pub mod directory;
pub mod filter;

/// Error type for query resolution
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// A referenced name matched nothing
    #[error("{0}")]
    NotFound(String),

    /// A parameter value is outside its allowed set
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
