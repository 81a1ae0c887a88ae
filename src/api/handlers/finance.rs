use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::handlers::teams::load_team;
use crate::api::middleware::auth::AuthUser;
use crate::api::state::AppState;
use crate::domain::finance::{team_balance, CostCategory, CostSetting, Transaction, TransactionType};
use crate::domain::matches::CardType;

#[derive(Debug, Deserialize)]
pub struct CostSettingRequest {
    pub name: String,
    pub amount: Decimal,
    pub category: CostCategory,
    pub card_type: Option<CardType>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub team_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub transaction_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub team_id: Uuid,
    pub balance: Decimal,
    pub transaction_count: usize,
}

/// GET /api/costs
pub async fn list_costs(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<CostSetting>>, ApiError> {
    auth.require_admin()?;
    Ok(Json(state.repos.finance.find_cost_settings().await?))
}

/// POST /api/costs
pub async fn create_cost(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CostSettingRequest>,
) -> Result<(StatusCode, Json<CostSetting>), ApiError> {
    auth.require_admin()?;

    let setting = CostSetting::new(req.name, req.amount, req.category, req.card_type)
        .map_err(ApiError::bad_request)?;
    state.repos.finance.save_cost_setting(&setting).await?;

    tracing::info!(cost_id = %setting.id, category = ?setting.category, "Cost setting created");
    Ok((StatusCode::CREATED, Json(setting)))
}

/// Changing an amount does not touch charges already booked
///
/// PUT /api/costs/:id
pub async fn update_cost(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CostSettingRequest>,
) -> Result<Json<CostSetting>, ApiError> {
    auth.require_admin()?;

    state
        .repos
        .finance
        .find_cost_setting(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Cost setting {} not found", id)))?;

    let setting = CostSetting {
        id,
        name: req.name.trim().to_string(),
        amount: req.amount,
        category: req.category,
        card_type: req.card_type,
    };
    setting.validate().map_err(ApiError::bad_request)?;
    state.repos.finance.save_cost_setting(&setting).await?;

    Ok(Json(setting))
}

/// DELETE /api/costs/:id
pub async fn delete_cost(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    state.repos.finance.delete_cost_setting(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Manual booking: deposits, adjustments or one-off charges
///
/// POST /api/transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    auth.require_admin()?;
    load_team(&state, req.team_id).await?;

    let transaction = Transaction::new(
        req.team_id,
        req.amount,
        req.transaction_type,
        req.description,
        req.transaction_date.unwrap_or_else(|| Utc::now().date_naive()),
    )
    .map_err(ApiError::bad_request)?;
    state.repos.finance.create_transaction(&transaction).await?;

    tracing::info!(
        transaction_id = %transaction.id,
        team_id = %transaction.team_id,
        amount = %transaction.amount,
        "Transaction booked"
    );
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// DELETE /api/transactions/:id
pub async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    state.repos.finance.delete_transaction(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/teams/:id/balance
pub async fn get_team_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(team_id): Path<Uuid>,
) -> Result<Json<BalanceResponse>, ApiError> {
    auth.require_team_manager(team_id)?;
    load_team(&state, team_id).await?;

    let transactions = state.repos.finance.find_transactions_by_team(team_id).await?;
    Ok(Json(BalanceResponse {
        team_id,
        balance: team_balance(&transactions),
        transaction_count: transactions.len(),
    }))
}

/// GET /api/teams/:id/transactions
pub async fn team_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(team_id): Path<Uuid>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    auth.require_team_manager(team_id)?;
    load_team(&state, team_id).await?;

    Ok(Json(state.repos.finance.find_transactions_by_team(team_id).await?))
}
