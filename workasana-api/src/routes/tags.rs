/// Tag endpoints
///
/// # Endpoints
///
/// - `POST /v1/tags` - Add a tag, or get the existing one with that name (auth)
/// - `GET /v1/tags` - List every tag
/// - `GET /v1/projects/:id/tags` - Tags used by a project's tasks

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::not_blank,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use workasana_shared::models::{project::Project, tag::Tag};

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AddTagRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "Tag name must be at most 100 characters")
    )]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub message: &'static str,
    pub tag: Tag,
}

/// Add a tag
///
/// Adding a name that already exists returns the existing tag.
///
/// # Endpoint
///
/// ```text
/// POST /v1/tags
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "name": "urgent" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Blank name
pub async fn add_tag(
    State(state): State<AppState>,
    Json(req): Json<AddTagRequest>,
) -> ApiResult<Json<TagResponse>> {
    req.validate()?;

    let tag = Tag::find_or_create(&state.db, &req.name).await?;

    Ok(Json(TagResponse {
        message: "Tag saved",
        tag,
    }))
}

/// List every tag, by name
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(Tag::list_all(&state.db).await?))
}

/// Distinct tags attached to the project's tasks
///
/// # Errors
///
/// - `404 Not Found`: Unknown project
pub async fn project_tags(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Tag>>> {
    if Project::find_by_id(&state.db, project_id).await?.is_none() {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    Ok(Json(Tag::list_by_project(&state.db, project_id).await?))
}
