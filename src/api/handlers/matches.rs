use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::handlers::teams::load_team;
use crate::api::middleware::auth::AuthUser;
use crate::api::state::AppState;
use crate::domain::finance::ChargeScope;
use crate::domain::matches::{LineupEntry, Match, MatchForm, MatchStatus, Side};
use crate::domain::polls::PollMonth;
use crate::services::charges::{BulkSyncReport, SyncReport};

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub matchday: Option<i32>,
    pub match_date: NaiveDateTime,
    pub location: String,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub referee: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMatchRequest {
    pub match_date: Option<NaiveDateTime>,
    pub location: Option<String>,
    pub referee: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MatchFilter {
    pub team_id: Option<Uuid>,
    /// `YYYY-MM`
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub id: Uuid,
    pub matchday: Option<i32>,
    pub match_date: NaiveDateTime,
    pub location: String,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub home_players: Vec<LineupEntry>,
    pub away_players: Vec<LineupEntry>,
    pub referee: Option<String>,
    pub referee_notes: Option<String>,
    pub status: MatchStatus,
}

impl From<&Match> for MatchResponse {
    fn from(m: &Match) -> Self {
        Self {
            id: m.id(),
            matchday: m.matchday(),
            match_date: m.match_date(),
            location: m.location().to_string(),
            home_team_id: m.home_team_id(),
            away_team_id: m.away_team_id(),
            home_score: m.home_score(),
            away_score: m.away_score(),
            home_players: m.lineup(Side::Home).to_vec(),
            away_players: m.lineup(Side::Away).to_vec(),
            referee: m.referee().map(str::to_string),
            referee_notes: m.referee_notes().map(str::to_string),
            status: m.status(),
        }
    }
}

/// The submitted match plus the outcome of the charge syncs it triggered
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    #[serde(rename = "match")]
    pub match_form: MatchResponse,
    pub sync: Vec<SyncReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<String>,
}

pub(crate) async fn load_match(state: &AppState, id: Uuid) -> Result<Match, ApiError> {
    state
        .repos
        .matches
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Match {} not found", id)))
}

/// Matches by date, optionally for one team or one month
///
/// GET /api/matches
pub async fn list_matches(
    State(state): State<AppState>,
    Query(filter): Query<MatchFilter>,
) -> Result<Json<Vec<MatchResponse>>, ApiError> {
    let matches = match filter.month.as_deref() {
        Some(month) => {
            let month = PollMonth::parse(month).map_err(ApiError::bad_request)?;
            let (start, end) = month.range();
            state.repos.matches.find_between(start, end).await?
        }
        None => state.repos.matches.find_all().await?,
    };

    Ok(Json(
        matches
            .iter()
            .filter(|m| filter.team_id.map_or(true, |team_id| m.involves_team(team_id)))
            .map(MatchResponse::from)
            .collect(),
    ))
}

/// POST /api/matches
pub async fn create_match(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateMatchRequest>,
) -> Result<(StatusCode, Json<MatchResponse>), ApiError> {
    auth.require_admin()?;
    load_team(&state, req.home_team_id).await?;
    load_team(&state, req.away_team_id).await?;

    let mut m = Match::new(
        req.matchday,
        req.match_date,
        req.location,
        req.home_team_id,
        req.away_team_id,
    )
    .map_err(ApiError::bad_request)?;
    m.assign_referee(req.referee).map_err(ApiError::bad_request)?;
    state.repos.matches.save(&m).await?;

    tracing::info!(match_id = %m.id(), date = %m.match_date(), "Match created");
    Ok((StatusCode::CREATED, Json(MatchResponse::from(&m))))
}

/// GET /api/matches/:id
pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, ApiError> {
    let m = load_match(&state, id).await?;
    Ok(Json(MatchResponse::from(&m)))
}

/// Reschedule a match or change its referee
///
/// PUT /api/matches/:id
pub async fn update_match(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMatchRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    auth.require_admin()?;
    let mut m = load_match(&state, id).await?;
    if req.match_date.is_none() && req.location.is_none() && req.referee.is_none() {
        return Ok(Json(MatchResponse::from(&m)));
    }

    if req.match_date.is_some() || req.location.is_some() {
        let match_date = req.match_date.unwrap_or(m.match_date());
        let location = req.location.unwrap_or_else(|| m.location().to_string());
        m.reschedule(match_date, location).map_err(ApiError::conflict)?;
    }
    if req.referee.is_some() {
        m.assign_referee(req.referee).map_err(ApiError::conflict)?;
    }
    if !state.repos.matches.save_schedule(&m).await? {
        return Err(changed_meanwhile());
    }

    Ok(Json(MatchResponse::from(&load_match(&state, id).await?)))
}

/// DELETE /api/matches/:id
pub async fn delete_match(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    state.repos.matches.delete(id).await?;
    tracing::info!(match_id = %id, "Match deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn changed_meanwhile() -> ApiError {
    ApiError::conflict("Match was changed in the meantime, reload and try again")
}

/// Every lined-up player must be registered on the team of their side
async fn check_lineups(state: &AppState, m: &Match, form: &MatchForm) -> Result<(), ApiError> {
    for (side, lineup) in [(Side::Home, &form.home_players), (Side::Away, &form.away_players)] {
        if lineup.is_empty() {
            continue;
        }
        let team_id = m.team_id(side);
        let roster: HashSet<Uuid> = state
            .repos
            .players
            .find_by_team(team_id)
            .await?
            .iter()
            .map(|p| p.id())
            .collect();

        if let Some(entry) = lineup.iter().find(|e| !roster.contains(&e.player_id)) {
            return Err(ApiError::bad_request(format!(
                "Player {} is not registered on team {}",
                entry.player_id, team_id
            )));
        }
    }
    Ok(())
}

/// Fill in the match form and sync the charges it implies
///
/// A failing sync does not undo the submission; it is reported as
/// `sync_error` and can be retried through the sync endpoints.
///
/// POST /api/matches/:id/submit
pub async fn submit_match(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(form): Json<MatchForm>,
) -> Result<Json<SubmitResponse>, ApiError> {
    auth.require_referee()?;
    let mut m = load_match(&state, id).await?;

    if m.is_locked() {
        return Err(ApiError::conflict("Match form is locked"));
    }
    check_lineups(&state, &m, &form).await?;
    m.submit(form).map_err(ApiError::bad_request)?;
    // A lock taken since the load wins over this form
    if !state.repos.matches.save_form(&m).await? {
        return Err(ApiError::conflict("Match form is locked"));
    }
    tracing::info!(match_id = %id, submitted_by = %auth.user_id(), "Match form submitted");

    let (sync, sync_error) = match state.charge_sync().sync_after_submit(id).await {
        Ok(reports) => (reports, None),
        Err(e) => {
            tracing::error!(match_id = %id, "Charge sync after submit failed: {}", e);
            (Vec::new(), Some(e.to_string()))
        }
    };

    Ok(Json(SubmitResponse {
        match_form: MatchResponse::from(&m),
        sync,
        sync_error,
    }))
}

/// POST /api/matches/:id/lock
pub async fn lock_match(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, ApiError> {
    auth.require_admin()?;
    let mut m = load_match(&state, id).await?;

    m.lock().map_err(ApiError::conflict)?;
    if !state.repos.matches.set_locked(id, m.is_locked()).await? {
        return Err(changed_meanwhile());
    }

    tracing::info!(match_id = %id, "Match form locked");
    Ok(Json(MatchResponse::from(&load_match(&state, id).await?)))
}

/// POST /api/matches/:id/unlock
pub async fn unlock_match(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, ApiError> {
    auth.require_admin()?;
    let mut m = load_match(&state, id).await?;

    m.unlock().map_err(ApiError::conflict)?;
    if !state.repos.matches.set_locked(id, m.is_locked()).await? {
        return Err(changed_meanwhile());
    }

    tracing::info!(match_id = %id, "Match form unlocked");
    Ok(Json(MatchResponse::from(&load_match(&state, id).await?)))
}

/// POST /api/matches/:id/sync/penalties
pub async fn sync_penalties(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SyncReport>, ApiError> {
    auth.require_admin()?;
    let report = state.charge_sync().sync_match(id, ChargeScope::CardPenalties).await?;
    Ok(Json(report))
}

/// POST /api/matches/:id/sync/costs
pub async fn sync_costs(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SyncReport>, ApiError> {
    auth.require_admin()?;
    let report = state.charge_sync().sync_match(id, ChargeScope::MatchCosts).await?;
    Ok(Json(report))
}

/// POST /api/matches/sync/costs
pub async fn sync_all_costs(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<BulkSyncReport>, ApiError> {
    auth.require_admin()?;
    let report = state.charge_sync().sync_all_match_costs().await?;
    Ok(Json(report))
}
