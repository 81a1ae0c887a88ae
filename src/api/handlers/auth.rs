use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::auth::AuthUser;
use crate::api::state::AppState;
use crate::auth::jwt::create_token;
use crate::auth::password::{hash_password, validate_new_password, verify_password};
use crate::auth::reset_token;
use crate::domain::repositories::User;
use crate::domain::user::value_objects::{Email, Role};
use crate::services::email::{send_in_background, EmailMessage};

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub team_id: Option<Uuid>,
    pub is_active: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_string(),
            full_name: user.full_name.clone(),
            role: user.role,
            team_id: user.team_id,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Login with email and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = Email::new(&req.email)
        .map_err(|e| ApiError::bad_request(format!("Invalid email: {}", e)))?;

    let user = state
        .repos
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !user.is_active {
        return Err(ApiError::unauthorized("Account is disabled"));
    }

    let valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
        ApiError::internal_server_error(format!("Password verification failed: {}", e))
    })?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if let Err(e) = state.repos.users.update_last_login(user.id).await {
        tracing::warn!(user_id = %user.id, "Failed to record last login: {}", e);
    }

    let token = create_token(user.id, user.role, user.team_id, &state.jwt_secret)
        .map_err(|e| ApiError::internal_server_error(format!("Failed to create token: {}", e)))?;

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

/// The logged-in user
///
/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .repos
        .users
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    Ok(Json(UserResponse::from(&user)))
}

/// Mails a reset link to an active account
///
/// Always answers the same way so the endpoint cannot be used to discover
/// which addresses have an account.
///
/// POST /api/auth/password-reset
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let response = Json(MessageResponse {
        message: "If an account exists for this address, a reset link has been sent".to_string(),
    });

    let Ok(email) = Email::new(&req.email) else {
        return Ok(response);
    };
    let user = match state.repos.users.find_by_email(&email).await? {
        Some(user) if user.is_active => user,
        _ => {
            tracing::debug!("Password reset requested for unknown or inactive account");
            return Ok(response);
        }
    };

    let (raw_token, record) = reset_token::issue(user.id, Utc::now());
    state.repos.users.store_reset_token(&record).await?;

    let link = format!("{}/reset-password?token={}", state.app_url, raw_token);
    let message = EmailMessage::password_reset(user.email.as_str(), &user.full_name, &link);
    // Delivery runs off the request so known and unknown addresses answer alike
    send_in_background(state.email.clone(), message);
    tracing::debug!(user_id = %user.id, "Password reset email queued");

    Ok(response)
}

/// Sets a new password with a reset token
///
/// POST /api/auth/password-reset/confirm
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetConfirm>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_new_password(&req.new_password).map_err(ApiError::bad_request)?;

    let token_hash = reset_token::hash_token(req.token.trim());
    let record = state
        .repos
        .users
        .find_reset_token(&token_hash)
        .await?
        .filter(|token| token.is_usable(Utc::now()))
        .ok_or_else(|| ApiError::bad_request("Reset link is invalid or has expired"))?;

    // Losing the race to a concurrent confirm means the token is spent
    if !state.repos.users.consume_reset_token(&token_hash).await? {
        return Err(ApiError::bad_request("Reset link is invalid or has expired"));
    }

    let password_hash = hash_password(&req.new_password)
        .map_err(|e| ApiError::internal_server_error(format!("Failed to hash password: {}", e)))?;
    state
        .repos
        .users
        .update_password(record.user_id, &password_hash)
        .await?;

    tracing::info!(user_id = %record.user_id, "Password reset completed");
    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
