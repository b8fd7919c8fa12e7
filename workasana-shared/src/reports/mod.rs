/// Reporting aggregates over tasks
///
/// - [`pending_work_total`]: remaining effort across unfinished tasks
/// - [`completed_last_week`]: tasks completed in the trailing seven days
/// - [`closed_task_report`]: closed tasks counted per team, project or owner

use chrono::{DateTime, Duration, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::models::task::{Task, TaskStatus, TASK_COLUMNS};

pub mod grouping;

use grouping::{group_closed_tasks, load_closed_tasks, GroupBy, GroupCount};

/// Length of the last-week window
pub const LAST_WEEK_DAYS: i64 = 7;

/// Sum of `time_to_complete` over tasks that are To Do, In Progress or Blocked
///
/// Returns 0 when no such task exists.
pub async fn pending_work_total<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(time_to_complete), 0)::BIGINT FROM tasks WHERE status = ANY($1)",
    )
    .bind(TaskStatus::PENDING.to_vec())
    .fetch_one(executor)
    .await?;

    tracing::debug!(total, "Computed pending work");

    Ok(total)
}

/// The `[from, to]` window covered by the last-week report at `now`
pub fn last_week_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now - Duration::days(LAST_WEEK_DAYS), now)
}

/// Completed tasks last updated within the week ending at `now`, newest first
pub async fn completed_last_week(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<Vec<Task>, sqlx::Error> {
    let (from, to) = last_week_window(now);

    let sql = format!(
        r#"
        SELECT {}
        FROM tasks
        WHERE status = $1 AND updated_at >= $2 AND updated_at <= $3
        ORDER BY updated_at DESC, id
        "#,
        TASK_COLUMNS
    );

    sqlx::query_as::<_, Task>(&sql)
        .bind(TaskStatus::Completed)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
}

/// Closed tasks grouped by `group_by`, names resolved from the database
pub async fn closed_task_report(
    pool: &PgPool,
    group_by: GroupBy,
) -> Result<Vec<GroupCount>, sqlx::Error> {
    let tasks = load_closed_tasks(pool).await?;
    let groups = group_closed_tasks(&tasks, group_by, pool).await?;

    tracing::debug!(
        group_by = group_by.field(),
        closed_tasks = tasks.len(),
        groups = groups.len(),
        "Computed closed-task report"
    );

    Ok(groups)
}
