/// Team endpoints
///
/// # Endpoints
///
/// - `POST /v1/teams` - Create a team (auth)
/// - `GET /v1/teams` - List every team with members populated
/// - `PUT /v1/teams/:id` - Update a team (auth, members only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{ensure_users_exist, not_blank},
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
    auth::{authorization::require_team_member, middleware::AuthContext},
    models::team::{member_list, CreateTeam, Team, TeamDetails, UpdateTeam},
};

/// Create team request
///
/// The caller is always the first member.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateTeamRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name must be at most 255 characters")
    )]
    pub name: String,

    pub description: Option<String>,

    pub members: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateTeamRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name must be at most 255 characters")
    )]
    pub name: Option<String>,

    pub description: Option<String>,

    /// Replaces the member list; the creator stays first
    pub members: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub message: &'static str,
    pub team: TeamDetails,
}

async fn load_details(state: &AppState, id: Uuid) -> ApiResult<TeamDetails> {
    Team::find_details(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))
}

/// Create a team
///
/// # Endpoint
///
/// ```text
/// POST /v1/teams
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "name": "Platform",
///   "members": ["uuid", "uuid"]
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: A member id doesn't belong to any user
/// - `409 Conflict`: Name already taken
pub async fn create_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)> {
    req.validate()?;

    let members = member_list(auth.user_id, &req.members);
    ensure_users_exist(&state.db, &members).await?;

    let team = Team::create(
        &state.db,
        CreateTeam {
            name: req.name,
            description: req.description,
            created_by: auth.user_id,
            members,
        },
    )
    .await?;

    let team = load_details(&state, team.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(TeamResponse {
            message: "Team created successfully",
            team,
        }),
    ))
}

/// List every team
pub async fn list_teams(State(state): State<AppState>) -> ApiResult<Json<Vec<TeamDetails>>> {
    Ok(Json(Team::list_details(&state.db).await?))
}

/// Update a team
///
/// A replacement `members` list keeps the team's creator as its first entry.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member
/// - `404 Not Found`: Unknown team or member id
pub async fn update_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTeamRequest>,
) -> ApiResult<Json<TeamResponse>> {
    req.validate()?;

    let team = Team::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;
    require_team_member(&team, auth.user_id)?;

    let members = req.members.map(|others| member_list(team.created_by, &others));
    if let Some(members) = &members {
        ensure_users_exist(&state.db, members).await?;
    }

    Team::update(
        &state.db,
        id,
        UpdateTeam {
            name: req.name,
            description: req.description,
            members,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    let team = load_details(&state, id).await?;

    Ok(Json(TeamResponse {
        message: "Team updated successfully",
        team,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_team_request_defaults() {
        let req: CreateTeamRequest = serde_json::from_str(r#"{"name": "Platform"}"#).unwrap();

        assert!(req.validate().is_ok());
        assert!(req.members.is_empty());
        assert!(req.description.is_none());
    }

    #[test]
    fn test_team_requests_reject_blank_names() {
        for name in ["", "   "] {
            let update = UpdateTeamRequest {
                name: Some(name.to_string()),
                ..Default::default()
            };
            assert!(update.validate().is_err(), "{:?}", name);

            let create = CreateTeamRequest {
                name: name.to_string(),
                ..Default::default()
            };
            assert!(create.validate().is_err(), "{:?}", name);
        }
    }
}
