use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::auth::AuthUser;
use crate::api::state::AppState;
use crate::domain::polls::{group_for_poll, PollGroup, PollMonth, RefereeAvailability};

#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub poll_month: String,
    pub groups: Vec<PollGroupResponse>,
}

#[derive(Debug, Serialize)]
pub struct PollGroupResponse {
    #[serde(flatten)]
    pub group: PollGroup,
    /// The caller's earlier answer, if every match of the group has the same one
    pub is_available: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    /// `YYYY-MM`
    pub poll_month: String,
    /// Any match of the group; the answer applies to the whole group
    pub match_id: Uuid,
    pub is_available: bool,
}

fn poll_month(year: i32, month: u32) -> Result<PollMonth, ApiError> {
    PollMonth::new(year, month).map_err(ApiError::bad_request)
}

async fn month_groups(state: &AppState, month: PollMonth) -> Result<Vec<PollGroup>, ApiError> {
    let (start, end) = month.range();
    let matches = state.repos.matches.find_between(start, end).await?;
    Ok(group_for_poll(&matches))
}

/// Poll groups of a month with the caller's answers
///
/// GET /api/polls/:year/:month
pub async fn get_poll(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<PollResponse>, ApiError> {
    auth.require_referee()?;
    let month = poll_month(year, month)?;

    let groups = month_groups(&state, month).await?;
    let answers: HashMap<Uuid, bool> = state
        .repos
        .polls
        .find_availability_by_month(&month.to_string())
        .await?
        .into_iter()
        .filter(|a| a.user_id == auth.user_id())
        .map(|a| (a.match_id, a.is_available))
        .collect();

    let groups = groups
        .into_iter()
        .map(|group| {
            let mut given = group.match_ids.iter().map(|id| answers.get(id).copied());
            let first = given.next().flatten();
            let is_available = if given.all(|answer| answer == first) { first } else { None };
            PollGroupResponse { group, is_available }
        })
        .collect();

    Ok(Json(PollResponse {
        poll_month: month.to_string(),
        groups,
    }))
}

/// Record an answer for every match of the group containing `match_id`
///
/// POST /api/polls/availability
pub async fn submit_availability(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<Vec<RefereeAvailability>>, ApiError> {
    auth.require_referee()?;
    let month = PollMonth::parse(&req.poll_month).map_err(ApiError::bad_request)?;

    let group = month_groups(&state, month)
        .await?
        .into_iter()
        .find(|group| group.match_ids.contains(&req.match_id))
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "Match {} is not part of a poll group in {}",
                req.match_id, month
            ))
        })?;

    let answers: Vec<RefereeAvailability> = group
        .match_ids
        .iter()
        .map(|match_id| RefereeAvailability::new(auth.user_id(), *match_id, month, req.is_available))
        .collect();
    let answers = state.repos.polls.upsert_availability(&answers).await?;

    tracing::info!(
        user_id = %auth.user_id(),
        poll_month = %month,
        matches = answers.len(),
        is_available = req.is_available,
        "Referee availability recorded"
    );
    Ok(Json(answers))
}

/// All answers for a month
///
/// GET /api/polls/:year/:month/availability
pub async fn list_availability(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<Vec<RefereeAvailability>>, ApiError> {
    auth.require_admin()?;
    let month = poll_month(year, month)?;

    Ok(Json(
        state
            .repos
            .polls
            .find_availability_by_month(&month.to_string())
            .await?,
    ))
}
