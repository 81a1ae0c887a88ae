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
use crate::domain::schedule::{generate_schedule, ScheduleRequest, ScheduledFixture, VacationPeriod};
use crate::domain::standings::{compute_standings, StandingRow};

#[derive(Debug, Deserialize)]
pub struct GenerateScheduleRequest {
    #[serde(flatten)]
    pub request: ScheduleRequest,
    /// Store the generated matches instead of only previewing them
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateScheduleResponse {
    pub fixtures: Vec<ScheduledFixture>,
    pub persisted: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateVacationRequest {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// League table
///
/// GET /api/standings
pub async fn get_standings(State(state): State<AppState>) -> Result<Json<Vec<StandingRow>>, ApiError> {
    let teams = state.repos.teams.find_all().await?;
    let matches = state.repos.matches.find_all().await?;
    Ok(Json(compute_standings(&teams, &matches)))
}

/// Round-robin schedule around the active vacation periods
///
/// POST /api/schedule/generate
pub async fn generate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<GenerateScheduleRequest>,
) -> Result<(StatusCode, Json<GenerateScheduleResponse>), ApiError> {
    auth.require_admin()?;

    for team_id in &req.request.team_ids {
        load_team(&state, *team_id).await?;
    }
    let vacations = state.repos.settings.find_vacations().await?;
    let fixtures = generate_schedule(&req.request, &vacations).map_err(ApiError::bad_request)?;

    if !req.persist {
        return Ok((
            StatusCode::OK,
            Json(GenerateScheduleResponse {
                fixtures,
                persisted: false,
            }),
        ));
    }

    let matches = fixtures
        .iter()
        .cloned()
        .map(|fixture| fixture.into_match(&req.request.location))
        .collect::<Result<Vec<_>, _>>()
        .map_err(ApiError::bad_request)?;
    state.repos.matches.save_all(&matches).await?;

    tracing::info!(
        matches = matches.len(),
        teams = req.request.team_ids.len(),
        double_round = req.request.double_round,
        "Schedule generated and stored"
    );
    Ok((
        StatusCode::CREATED,
        Json(GenerateScheduleResponse {
            fixtures,
            persisted: true,
        }),
    ))
}

/// GET /api/vacations
pub async fn list_vacations(State(state): State<AppState>) -> Result<Json<Vec<VacationPeriod>>, ApiError> {
    Ok(Json(state.repos.settings.find_vacations().await?))
}

/// POST /api/vacations
pub async fn create_vacation(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateVacationRequest>,
) -> Result<(StatusCode, Json<VacationPeriod>), ApiError> {
    auth.require_admin()?;

    let vacation =
        VacationPeriod::new(req.name, req.start_date, req.end_date).map_err(ApiError::bad_request)?;
    state.repos.settings.save_vacation(&vacation).await?;

    Ok((StatusCode::CREATED, Json(vacation)))
}

/// DELETE /api/vacations/:id
pub async fn delete_vacation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    state.repos.settings.delete_vacation(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
