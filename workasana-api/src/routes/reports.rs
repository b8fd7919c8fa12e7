/// Report endpoints
///
/// # Endpoints
///
/// - `GET /v1/report/closed?groupBy=team|owner|project` - Closed tasks counted per group
/// - `GET /v1/report/pending` - Remaining effort across unfinished tasks
/// - `GET /v1/report/last-week` - Tasks completed in the last seven days

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use workasana_shared::{
    models::task::Task,
    reports::{
        self,
        grouping::{GroupBy, GroupCount},
    },
};

#[derive(Debug, Deserialize)]
pub struct ClosedReportParams {
    #[serde(rename = "groupBy")]
    pub group_by: Option<String>,
}

/// Aggregate payload shared by the closed and pending reports
#[derive(Debug, Serialize)]
pub struct Aggregate<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse<T> {
    pub message: &'static str,
    pub report: T,
}

/// Closed tasks counted per team, owner or project
///
/// # Endpoint
///
/// ```text
/// GET /v1/report/closed?groupBy=owner
/// ```
///
/// # Response
///
/// ```json
/// {
///   "message": "Closed tasks report",
///   "report": {
///     "success": true,
///     "data": [
///       { "group": "uuid", "groupName": "Ada", "groupByField": "owners", "taskCount": 2 }
///     ]
///   }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: `groupBy` missing or not one of team, owner, project
pub async fn closed_tasks(
    State(state): State<AppState>,
    Query(params): Query<ClosedReportParams>,
) -> ApiResult<Json<ReportResponse<Aggregate<Vec<GroupCount>>>>> {
    let group_by: GroupBy = params
        .group_by
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("groupBy is required".to_string()))?
        .parse()?;

    let data = reports::closed_task_report(&state.db, group_by).await?;

    Ok(Json(ReportResponse {
        message: "Closed tasks report",
        report: Aggregate {
            success: true,
            data,
        },
    }))
}

/// Sum of `time_to_complete` over To Do, In Progress and Blocked tasks
pub async fn pending_work(
    State(state): State<AppState>,
) -> ApiResult<Json<ReportResponse<Aggregate<i64>>>> {
    let data = reports::pending_work_total(&state.db).await?;

    Ok(Json(ReportResponse {
        message: "Pending work report",
        report: Aggregate {
            success: true,
            data,
        },
    }))
}

/// Tasks completed within the last seven days
pub async fn last_week(
    State(state): State<AppState>,
) -> ApiResult<Json<ReportResponse<Vec<Task>>>> {
    let report = reports::completed_last_week(&state.db, Utc::now()).await?;

    Ok(Json(ReportResponse {
        message: "Tasks completed last week",
        report,
    }))
}
