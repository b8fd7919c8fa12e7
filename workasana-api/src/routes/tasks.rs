/// Task endpoints
///
/// # Endpoints
///
/// - `POST /v1/tasks` - Create a task (auth)
/// - `GET /v1/tasks?team=&owner=&tags=&project=&status=` - Query tasks by name (auth)
/// - `GET /v1/tasks/all` - List every task
/// - `GET /v1/tasks/mine` - Tasks the caller owns (auth)
/// - `PUT /v1/tasks/:id` - Update a task (auth, owners only)
/// - `DELETE /v1/tasks/:id` - Delete a task (auth, owners only)
///
/// Every task in a response has its project, team, owners and tags
/// populated.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{ensure_tags_exist, ensure_users_exist, not_blank},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use workasana_shared::{
    auth::{authorization::require_task_owner, middleware::AuthContext},
    models::{
        dedup_ids,
        task::{owner_list, CreateTask, Task, TaskDetails, TaskStatus, UpdateTask},
    },
    query::filter::{TaskFilter, TaskQuery},
};

/// Create task request
///
/// `owners` and `tags` are ids. The caller is always added as the first
/// owner.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateTaskRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name must be at most 255 characters")
    )]
    pub name: String,

    #[validate(required(message = "Project is required"))]
    pub project: Option<Uuid>,

    #[validate(required(message = "Team is required"))]
    pub team: Option<Uuid>,

    pub owners: Vec<Uuid>,

    pub tags: Vec<Uuid>,

    #[validate(
        required(message = "Time to complete is required"),
        range(min = 0, message = "Time to complete must not be negative")
    )]
    pub time_to_complete: Option<i32>,

    pub status: Option<TaskStatus>,
}

/// Update task request; omitted fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateTaskRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name must be at most 255 characters")
    )]
    pub name: Option<String>,

    pub project: Option<Uuid>,

    pub team: Option<Uuid>,

    pub owners: Option<Vec<Uuid>>,

    pub tags: Option<Vec<Uuid>>,

    #[validate(range(min = 0, message = "Time to complete must not be negative"))]
    pub time_to_complete: Option<i32>,

    pub status: Option<TaskStatus>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub message: &'static str,
    pub task: TaskDetails,
}

#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    pub message: &'static str,
    pub id: Uuid,
}

async fn load_details(state: &AppState, id: Uuid) -> ApiResult<TaskDetails> {
    Task::find_details(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

async fn load_owned_task(state: &AppState, id: Uuid, user_id: Uuid) -> ApiResult<Task> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_task_owner(&task, user_id)?;

    Ok(task)
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /v1/tasks
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "name": "Draft launch email",
///   "project": "uuid",
///   "team": "uuid",
///   "owners": ["uuid"],
///   "tags": ["uuid"],
///   "time_to_complete": 3,
///   "status": "In Progress"
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Unknown project, team, owner or tag
/// - `422 Unprocessable Entity`: Missing name, project, team or time_to_complete
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate()?;

    let (Some(project_id), Some(team_id), Some(time_to_complete)) =
        (req.project, req.team, req.time_to_complete)
    else {
        return Err(ApiError::BadRequest(
            "project, team and time_to_complete are required".to_string(),
        ));
    };

    let owners = owner_list(auth.user_id, &req.owners);
    let tags = dedup_ids(req.tags);
    ensure_users_exist(&state.db, &owners).await?;
    ensure_tags_exist(&state.db, &tags).await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            name: req.name,
            project_id,
            team_id,
            created_by: auth.user_id,
            owners,
            tags,
            time_to_complete,
            status: req.status.unwrap_or_default(),
        },
    )
    .await?;

    let task = load_details(&state, task.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: "Task created successfully",
            task,
        }),
    ))
}

/// Query tasks by team, owner, tags, project and status names
///
/// # Endpoint
///
/// ```text
/// GET /v1/tasks?team=Platform&owner=Ada,Grace&tags=urgent&status=To%20Do
/// Authorization: Bearer <token>
/// ```
///
/// `owner`, `tags` and `status` take comma-separated lists and may be
/// repeated. A task matches when it is in the team and project, has any of
/// the owners, carries all of the tags and is in any of the statuses.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown status value
/// - `404 Not Found`: Unknown team or project, or no matching owner or tag
pub async fn query_tasks(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<TaskDetails>>> {
    let query = TaskQuery::from_pairs(params);
    let filter = TaskFilter::resolve(&query, &state.db).await?;
    let tasks = filter.fetch(&state.db).await?;

    tracing::debug!(matches = tasks.len(), "Queried tasks");

    Ok(Json(tasks))
}

/// List every task
pub async fn list_all_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskDetails>>> {
    Ok(Json(Task::list_details(&state.db).await?))
}

/// Tasks the caller owns
pub async fn my_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskDetails>>> {
    Ok(Json(Task::list_details_by_owner(&state.db, auth.user_id).await?))
}

/// Update a task
///
/// A replacement `owners` list keeps the task's creator as its first entry.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an owner of the task
/// - `404 Not Found`: Unknown task, project, team, owner or tag
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate()?;
    let task = load_owned_task(&state, id, auth.user_id).await?;

    let owners = req.owners.map(|others| owner_list(task.created_by, &others));
    let tags = req.tags.map(dedup_ids);

    if let Some(owners) = &owners {
        ensure_users_exist(&state.db, owners).await?;
    }
    if let Some(tags) = &tags {
        ensure_tags_exist(&state.db, tags).await?;
    }

    Task::update(
        &state.db,
        id,
        UpdateTask {
            name: req.name,
            project_id: req.project,
            team_id: req.team,
            owners,
            tags,
            time_to_complete: req.time_to_complete,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let task = load_details(&state, id).await?;

    Ok(Json(TaskResponse {
        message: "Task updated successfully",
        task,
    }))
}

/// Delete a task
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an owner of the task
/// - `404 Not Found`: Unknown task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    load_owned_task(&state, id, auth.user_id).await?;

    if !Task::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(Json(DeleteTaskResponse {
        message: "Task deleted successfully",
        id,
    }))
}
