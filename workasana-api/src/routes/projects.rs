/// Project endpoints
///
/// # Endpoints
///
/// - `POST /v1/projects` - Create a project (auth)
/// - `GET /v1/projects` - List every project
/// - `GET /v1/projects/mine` - Projects in the caller's list (auth)
/// - `PUT /v1/projects/:id` - Update a project (auth, creator only)
/// - `DELETE /v1/projects/:id` - Delete a project and its tasks (auth, creator only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::not_blank,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use workasana_shared::{
    auth::{authorization::require_project_creator, middleware::AuthContext},
    models::{
        project::{CreateProject, Project, ProjectDeletion, ProjectDetails, UpdateProject},
        user::User,
    },
};

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateProjectRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name must be at most 255 characters")
    )]
    pub name: String,

    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateProjectRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name must be at most 255 characters")
    )]
    pub name: Option<String>,

    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub message: &'static str,
    pub project: ProjectDetails,
}

#[derive(Debug, Serialize)]
pub struct DeleteProjectResponse {
    pub message: &'static str,

    #[serde(flatten)]
    pub deletion: ProjectDeletion,
}

async fn load_details(state: &AppState, id: Uuid) -> ApiResult<ProjectDetails> {
    Project::find_details_by_ids(&state.db, &[id])
        .await?
        .pop()
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}

async fn load_own_project(state: &AppState, id: Uuid, user_id: Uuid) -> ApiResult<Project> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    require_project_creator(&project, user_id)?;

    Ok(project)
}

/// Create a project
///
/// # Endpoint
///
/// ```text
/// POST /v1/projects
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "name": "Launch",
///   "description": "Spring launch checklist"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Name already taken
/// - `422 Unprocessable Entity`: Missing name
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    req.validate()?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            created_by: auth.user_id,
        },
    )
    .await?;

    let project = load_details(&state, project.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            message: "Project created successfully",
            project,
        }),
    ))
}

/// List every project with its creator
pub async fn list_projects(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProjectDetails>>> {
    Ok(Json(Project::list_details(&state.db).await?))
}

/// Projects in the caller's project list
///
/// # Errors
///
/// - `404 Not Found`: The caller has no projects
pub async fn my_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectDetails>>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let projects = Project::find_details_by_ids(&state.db, &user.project_ids).await?;
    if projects.is_empty() {
        return Err(ApiError::NotFound("No projects found".to_string()));
    }

    Ok(Json(projects))
}

/// Update a project's name or description
///
/// # Errors
///
/// - `403 Forbidden`: Caller did not create the project
/// - `404 Not Found`: Unknown project
/// - `409 Conflict`: New name already taken
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    req.validate()?;
    load_own_project(&state, id, auth.user_id).await?;

    let update = UpdateProject {
        name: req.name,
        description: req.description,
    };
    if !update.is_empty() {
        Project::update(&state.db, id, update)
            .await?
            .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    }

    let project = load_details(&state, id).await?;

    Ok(Json(ProjectResponse {
        message: "Project updated successfully",
        project,
    }))
}

/// Delete a project, its tasks and every list reference to them
///
/// # Errors
///
/// - `403 Forbidden`: Caller did not create the project
/// - `404 Not Found`: Unknown project
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteProjectResponse>> {
    load_own_project(&state, id, auth.user_id).await?;

    let deletion = Project::delete_cascade(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(DeleteProjectResponse {
        message: "Project deleted successfully",
        deletion,
    }))
}
