use thiserror::Error;

/// Errors raised by repository implementations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Stored data is invalid: {0}")]
    Corrupt(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for foreign key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &error {
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) | Some(FOREIGN_KEY_VIOLATION) => {
                    return RepositoryError::Conflict(db.message().to_string())
                }
                _ => {}
            }
        }
        RepositoryError::Database(error)
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(error: serde_json::Error) -> Self {
        RepositoryError::Corrupt(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_entity() {
        let err = RepositoryError::NotFound("Team 42".to_string());
        assert_eq!(err.to_string(), "Team 42 not found");
    }

    #[test]
    fn non_database_sqlx_errors_stay_database_errors() {
        let err: RepositoryError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
