use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Email value object representing a normalized email address
///
/// # Invariants
/// - Stored trimmed and lowercased
/// - Exactly one '@' with a non-empty local part
/// - Domain part is non-empty and contains a '.'
/// - No whitespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Creates a new Email value object
    ///
    /// # Arguments
    /// * `email` - Address to validate; trimmed and lowercased
    ///
    /// # Returns
    /// * `Ok(Email)` - If the address is valid
    /// * `Err(String)` - If it is not
    ///
    /// # Example
    /// ```
    /// use minivoetbal_api::domain::user::value_objects::Email;
    ///
    /// let email = Email::new("  Secretaris@Club.be ").expect("valid email");
    /// assert_eq!(email.as_str(), "secretaris@club.be");
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self, String> {
        let normalized = email.into().trim().to_lowercase();
        if Self::is_valid(&normalized) {
            Ok(Email(normalized))
        } else {
            Err(format!("Invalid email: {}", normalized))
        }
    }

    fn is_valid(email: &str) -> bool {
        if email.chars().any(char::is_whitespace) {
            return false;
        }
        match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        }
    }

    /// Returns the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// Role of an authenticated portal user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Referee,
    PlayerManager,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Referee => write!(f, "referee"),
            Role::PlayerManager => write!(f, "player_manager"),
        }
    }
}

/// Who is looking at a resource
///
/// Public visitors carry no identity. Authenticated viewers carry the
/// claims of their token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Public,
    User {
        user_id: Uuid,
        role: Role,
        team_id: Option<Uuid>,
    },
}

impl Viewer {
    pub fn role(&self) -> Option<Role> {
        match self {
            Viewer::Public => None,
            Viewer::User { role, .. } => Some(*role),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// Admins manage every team, player managers only their own
    pub fn can_manage_team(&self, team_id: Uuid) -> bool {
        match self {
            Viewer::Public => false,
            Viewer::User { role: Role::Admin, .. } => true,
            Viewer::User {
                role: Role::PlayerManager,
                team_id: Some(own),
                ..
            } => *own == team_id,
            Viewer::User { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email() {
        assert!(Email::new("test@example.com").is_ok());
    }

    #[test]
    fn email_is_normalized() {
        let email = Email::new("  Kapitein@FC-Zaal.BE ").unwrap();
        assert_eq!(email.as_str(), "kapitein@fc-zaal.be");
    }

    #[test]
    fn invalid_email_no_at_symbol() {
        assert!(Email::new("invalid").is_err());
    }

    #[test]
    fn invalid_email_without_domain_dot() {
        assert!(Email::new("a@b").is_err());
    }

    #[test]
    fn invalid_email_two_at_symbols() {
        assert!(Email::new("a@b@c.be").is_err());
    }

    #[test]
    fn invalid_email_inner_whitespace() {
        assert!(Email::new("jan peeters@club.be").is_err());
    }

    #[test]
    fn invalid_email_empty() {
        assert!(Email::new("").is_err());
    }

    #[test]
    fn email_deserializes_through_validation() {
        let ok: Result<Email, _> = serde_json::from_str("\"Info@Club.be\"");
        assert_eq!(ok.unwrap().as_str(), "info@club.be");

        let bad: Result<Email, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&Role::PlayerManager).unwrap();
        assert_eq!(json, "\"player_manager\"");
        assert_eq!(Role::PlayerManager.to_string(), "player_manager");
    }

    #[test]
    fn player_manager_manages_only_own_team() {
        let own = Uuid::new_v4();
        let viewer = Viewer::User {
            user_id: Uuid::new_v4(),
            role: Role::PlayerManager,
            team_id: Some(own),
        };

        assert!(viewer.can_manage_team(own));
        assert!(!viewer.can_manage_team(Uuid::new_v4()));
    }

    #[test]
    fn admin_manages_every_team() {
        let viewer = Viewer::User {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
            team_id: None,
        };

        assert!(viewer.is_admin());
        assert!(viewer.can_manage_team(Uuid::new_v4()));
    }

    #[test]
    fn public_and_referee_manage_nothing() {
        let referee = Viewer::User {
            user_id: Uuid::new_v4(),
            role: Role::Referee,
            team_id: None,
        };

        assert!(!Viewer::Public.can_manage_team(Uuid::new_v4()));
        assert!(!referee.can_manage_team(Uuid::new_v4()));
    }
}
