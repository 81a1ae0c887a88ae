use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::user::value_objects::{Email, Role};

/// A portal account
///
/// Player managers are bound to the team they manage.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: Email,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub team_id: Option<Uuid>,
    pub is_active: bool,
}

impl User {
    pub fn new(
        email: Email,
        password_hash: String,
        full_name: impl Into<String>,
        role: Role,
        team_id: Option<Uuid>,
    ) -> Result<Self, String> {
        let full_name = full_name.into().trim().to_string();
        if full_name.is_empty() {
            return Err("Full name cannot be empty".to_string());
        }
        match (role, team_id) {
            (Role::PlayerManager, None) => {
                return Err("A player manager must be linked to a team".to_string())
            }
            (Role::Admin | Role::Referee, Some(_)) => {
                return Err(format!("A {} cannot be linked to a team", role))
            }
            _ => {}
        }

        Ok(Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            full_name,
            role,
            team_id,
            is_active: true,
        })
    }
}

/// A pending password reset; only the SHA-256 of the token is stored
#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub token_hash: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl PasswordResetToken {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && now < self.expires_at
    }
}

/// Repository trait for users and their reset tokens
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user, `Conflict` if the email is taken
    async fn create(&self, user: User) -> RepositoryResult<Uuid>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<User>>;

    /// All users ordered by name
    async fn find_all(&self) -> RepositoryResult<Vec<User>>;

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> RepositoryResult<()>;

    async fn update_last_login(&self, user_id: Uuid) -> RepositoryResult<()>;

    async fn store_reset_token(&self, token: &PasswordResetToken) -> RepositoryResult<()>;

    async fn find_reset_token(&self, token_hash: &str)
        -> RepositoryResult<Option<PasswordResetToken>>;

    /// Marks the token used; returns false if it was already used
    async fn consume_reset_token(&self, token_hash: &str) -> RepositoryResult<bool>;
}
