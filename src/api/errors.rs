use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::repositories::RepositoryError;
use crate::services::charges::SyncError;
use crate::services::suspensions::RuleUpdateError;

/// API error type with HTTP status code and message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a 403 Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        }

        let body = Json(json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(_) => Self::not_found(error.to_string()),
            RepositoryError::Conflict(message) => Self::conflict(message),
            RepositoryError::Database(_) | RepositoryError::Corrupt(_) => {
                Self::internal_server_error(error.to_string())
            }
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(error: SyncError) -> Self {
        match error {
            SyncError::MatchNotFound(_) => Self::not_found(error.to_string()),
            SyncError::Repository(inner) => inner.into(),
        }
    }
}

impl From<RuleUpdateError> for ApiError {
    fn from(error: RuleUpdateError) -> Self {
        match error {
            RuleUpdateError::Invalid(message) => Self::bad_request(message),
            RuleUpdateError::Repository(inner) => inner.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_map_to_statuses() {
        let not_found: ApiError = RepositoryError::NotFound("Team 1".to_string()).into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert_eq!(not_found.message, "Team 1 not found");

        let conflict: ApiError =
            RepositoryError::Conflict("duplicate key value violates unique constraint \"teams_name_key\"".to_string())
                .into();
        assert_eq!(conflict.status, StatusCode::CONFLICT);
        assert!(conflict.message.contains("teams_name_key"));

        let corrupt: ApiError = RepositoryError::Corrupt("bad email".to_string()).into();
        assert_eq!(corrupt.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_rules_are_bad_requests() {
        let err: ApiError = RuleUpdateError::Invalid("overlap".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "overlap");
    }
}
