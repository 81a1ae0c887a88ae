use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::handlers::auth::UserResponse;
use crate::api::middleware::auth::AuthUser;
use crate::api::state::AppState;
use crate::auth::password::{hash_password, validate_new_password};
use crate::domain::repositories::User;
use crate::domain::user::value_objects::{Email, Role};
use crate::services::email::EmailMessage;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub team_id: Option<Uuid>,
}

/// Create an account and send a welcome mail
///
/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    auth.require_admin()?;

    let email = Email::new(&req.email)
        .map_err(|e| ApiError::bad_request(format!("Invalid email: {}", e)))?;
    validate_new_password(&req.password).map_err(ApiError::bad_request)?;

    if let Some(team_id) = req.team_id {
        state
            .repos
            .teams
            .find_by_id(team_id)
            .await?
            .ok_or_else(|| ApiError::bad_request(format!("Team {} does not exist", team_id)))?;
    }

    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::internal_server_error(format!("Failed to hash password: {}", e)))?;
    let user = User::new(email, password_hash, req.full_name, req.role, req.team_id)
        .map_err(ApiError::bad_request)?;

    if state.repos.users.find_by_email(&user.email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }
    state.repos.users.create(user.clone()).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "User created");

    let login_url = format!("{}/login", state.app_url);
    let welcome = EmailMessage::welcome(
        user.email.as_str(),
        &user.full_name,
        &user.role.to_string(),
        &login_url,
    );
    if let Err(e) = state.email.send(&welcome).await {
        tracing::error!(user_id = %user.id, "Failed to send welcome email: {}", e);
    }

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// All accounts
///
/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    auth.require_admin()?;

    let users = state.repos.users.find_all().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}
