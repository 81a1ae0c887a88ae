use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::handlers::players::PlayerResponse;
use crate::api::middleware::auth::AuthUser;
use crate::api::state::AppState;
use crate::domain::team::{Team, TeamContact};

/// Request body for creating or updating a team
#[derive(Debug, Deserialize)]
pub struct TeamRequest {
    pub name: String,
    #[serde(flatten)]
    pub contact: TeamContact,
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub contact: TeamContact,
    pub created_at: DateTime<Utc>,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id(),
            name: team.name().to_string(),
            contact: team.contact().clone(),
            created_at: team.created_at(),
        }
    }
}

pub(crate) async fn load_team(state: &AppState, id: Uuid) -> Result<Team, ApiError> {
    state
        .repos
        .teams
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Team {} not found", id)))
}

/// All teams, by name
///
/// GET /api/teams
pub async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<TeamResponse>>, ApiError> {
    let teams = state.repos.teams.find_all().await?;
    Ok(Json(teams.iter().map(TeamResponse::from).collect()))
}

/// Create a new team
///
/// A duplicate name comes back as 409 with the database's message.
///
/// POST /api/teams
pub async fn create_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<TeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    auth.require_admin()?;

    let team = Team::new(req.name, req.contact).map_err(ApiError::bad_request)?;
    state.repos.teams.save(&team).await?;

    tracing::info!(team_id = %team.id(), name = %team.name(), "Team created");
    Ok((StatusCode::CREATED, Json(TeamResponse::from(&team))))
}

/// Get a team by ID
///
/// GET /api/teams/:id
pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = load_team(&state, id).await?;
    Ok(Json(TeamResponse::from(&team)))
}

/// PUT /api/teams/:id
pub async fn update_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<TeamRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    auth.require_admin()?;

    let mut team = load_team(&state, id).await?;
    team.update(req.name, req.contact)
        .map_err(ApiError::bad_request)?;
    state.repos.teams.save(&team).await?;

    Ok(Json(TeamResponse::from(&team)))
}

/// Delete a team
///
/// DELETE /api/teams/:id
pub async fn delete_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    state.repos.teams.delete(id).await?;
    tracing::info!(team_id = %id, "Team deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Players of a team
///
/// GET /api/teams/:id/players
pub async fn list_team_players(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PlayerResponse>>, ApiError> {
    load_team(&state, id).await?;
    let players = state.repos.players.find_by_team(id).await?;
    Ok(Json(players.iter().map(PlayerResponse::from).collect()))
}
