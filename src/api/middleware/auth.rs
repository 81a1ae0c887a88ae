use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::auth::jwt::{verify_token, Claims};
use crate::domain::user::value_objects::{Role, Viewer};

/// JWT authentication extractor for protected routes
///
/// Usage:
/// ```rust,ignore
/// async fn protected_handler(auth: AuthUser) -> Result<String, ApiError> {
///     auth.require_admin()?;
///     Ok(format!("Hello admin {}", auth.user_id()))
/// }
/// ```
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.0.sub
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn viewer(&self) -> Viewer {
        self.0.viewer()
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        match self.0.role {
            Role::Admin => Ok(()),
            _ => Err(ApiError::forbidden("Admin access required")),
        }
    }

    pub fn require_referee(&self) -> Result<(), ApiError> {
        match self.0.role {
            Role::Admin | Role::Referee => Ok(()),
            Role::PlayerManager => Err(ApiError::forbidden("Referee access required")),
        }
    }

    /// Admins, or the player manager of this team
    pub fn require_team_manager(&self, team_id: Uuid) -> Result<(), ApiError> {
        if self.viewer().can_manage_team(team_id) {
            Ok(())
        } else {
            Err(ApiError::forbidden("You do not manage this team"))
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or_else(|| ApiError::unauthorized("Invalid authorization format. Use: Bearer <token>"))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let claims = verify_token(token, &state.jwt_secret)
            .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

        Ok(AuthUser(claims))
    }
}

/// Viewer of a public route
///
/// Never rejects: a missing, malformed or expired token reads as `Public`.
pub struct MaybeViewer(pub Viewer);

#[async_trait]
impl FromRequestParts<AppState> for MaybeViewer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let viewer = match bearer_token(parts) {
            Ok(Some(token)) => match verify_token(token, &state.jwt_secret) {
                Ok(claims) => claims.viewer(),
                Err(e) => {
                    tracing::debug!("Ignoring invalid token on public route: {}", e);
                    Viewer::Public
                }
            },
            Ok(None) | Err(_) => Viewer::Public,
        };
        Ok(MaybeViewer(viewer))
    }
}
