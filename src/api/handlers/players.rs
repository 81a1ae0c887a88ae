use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::handlers::teams::load_team;
use crate::api::middleware::auth::AuthUser;
use crate::api::state::AppState;
use crate::domain::player::Player;
use crate::domain::suspension::{CardTally, SuspensionStatus};

#[derive(Debug, Deserialize)]
pub struct CreatePlayerRequest {
    pub team_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlayerRequest {
    pub team_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct PlayerResponse {
    pub id: Uuid,
    pub team_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub is_active: bool,
}

impl From<&Player> for PlayerResponse {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id(),
            team_id: player.team_id(),
            first_name: player.first_name().to_string(),
            last_name: player.last_name().to_string(),
            full_name: player.full_name(),
            birth_date: player.birth_date(),
            is_active: player.is_active(),
        }
    }
}

async fn load_player(state: &AppState, id: Uuid) -> Result<Player, ApiError> {
    state
        .repos
        .players
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Player {} not found", id)))
}

/// Register a player on a team
///
/// POST /api/players
pub async fn create_player(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<PlayerResponse>), ApiError> {
    auth.require_team_manager(req.team_id)?;
    load_team(&state, req.team_id).await?;

    let player = Player::new(req.team_id, req.first_name, req.last_name, req.birth_date)
        .map_err(ApiError::bad_request)?;
    state.repos.players.save(&player).await?;

    tracing::info!(player_id = %player.id(), team_id = %player.team_id(), "Player registered");
    Ok((StatusCode::CREATED, Json(PlayerResponse::from(&player))))
}

/// GET /api/players/:id
pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let player = load_player(&state, id).await?;
    Ok(Json(PlayerResponse::from(&player)))
}

/// Edit a player; moving to another team needs rights on both teams
///
/// PUT /api/players/:id
pub async fn update_player(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePlayerRequest>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let mut player = load_player(&state, id).await?;
    auth.require_team_manager(player.team_id())?;

    let team_id = req.team_id.unwrap_or(player.team_id());
    if team_id != player.team_id() {
        auth.require_team_manager(team_id)?;
        load_team(&state, team_id).await?;
    }

    player
        .update(team_id, req.first_name, req.last_name, req.birth_date, req.is_active)
        .map_err(ApiError::bad_request)?;
    state.repos.players.save(&player).await?;

    Ok(Json(PlayerResponse::from(&player)))
}

/// DELETE /api/players/:id
pub async fn delete_player(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let player = load_player(&state, id).await?;
    auth.require_team_manager(player.team_id())?;

    state.repos.players.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Cards collected over submitted matches and the suspension they imply
///
/// GET /api/players/:id/suspension
pub async fn player_suspension(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuspensionStatus>, ApiError> {
    let player = load_player(&state, id).await?;
    let matches = state.repos.matches.find_all().await?;
    let rules = state.suspension_rules.current().await;

    let tally = CardTally::for_player(player.id(), &matches);
    Ok(Json(SuspensionStatus::evaluate(player.id(), tally, &rules)))
}
