use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::Email;

/// Contact details of a team's responsible person
///
/// Every field is optional: older databases have no contact columns at
/// all, in which case teams are loaded with an empty contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamContact {
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<Email>,
}

impl TeamContact {
    /// Trims the text fields, drops blank ones and validates the phone number
    pub fn normalized(self) -> Result<Self, String> {
        let contact_person = non_blank(self.contact_person);
        let contact_phone = non_blank(self.contact_phone);

        if let Some(phone) = &contact_phone {
            let allowed = phone
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '/' | '-' | '.'));
            let digits = phone.chars().filter(char::is_ascii_digit).count();
            if !allowed || digits < 6 {
                return Err(format!("Invalid phone number: {}", phone));
            }
        }

        Ok(Self {
            contact_person,
            contact_phone,
            contact_email: self.contact_email,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A team registered in the league
///
/// # Invariants
/// - Name is trimmed and never empty
/// - Contact phone, when present, holds at least six digits
///
/// # Example
/// ```
/// use minivoetbal_api::domain::team::{Team, TeamContact};
///
/// let team = Team::new("  FC De Kampioenen ", TeamContact::default()).expect("valid team");
/// assert_eq!(team.name(), "FC De Kampioenen");
/// ```
#[derive(Debug, Clone)]
pub struct Team {
    id: Uuid,
    name: String,
    contact: TeamContact,
    created_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new team
    ///
    /// # Arguments
    /// * `name` - Team name, trimmed, must not be empty
    /// * `contact` - Optional contact details
    ///
    /// # Returns
    /// * `Err(String)` - If the name is empty or the contact is invalid
    pub fn new(name: impl Into<String>, contact: TeamContact) -> Result<Self, String> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: validate_name(name.into())?,
            contact: contact.normalized()?,
            created_at: Utc::now(),
        })
    }

    /// Replaces name and contact details, keeping identity and creation time
    pub fn update(&mut self, name: impl Into<String>, contact: TeamContact) -> Result<(), String> {
        let name = validate_name(name.into())?;
        let contact = contact.normalized()?;
        self.name = name;
        self.contact = contact;
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &TeamContact {
        &self.contact
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Reconstructs a Team from persistence layer data
    ///
    /// Only to be used by repository implementations.
    pub fn from_persistence(
        id: Uuid,
        name: String,
        contact: TeamContact,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            contact,
            created_at,
        }
    }
}

fn validate_name(name: String) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Team name cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_team_trims_name() {
        let team = Team::new("  Zaalvoetbal Lede  ", TeamContact::default()).unwrap();
        assert_eq!(team.name(), "Zaalvoetbal Lede");
        assert_eq!(team.contact(), &TeamContact::default());
    }

    #[test]
    fn create_team_with_blank_name_fails() {
        let result = Team::new("   ", TeamContact::default());
        assert!(result.unwrap_err().contains("Team name cannot be empty"));
    }

    #[test]
    fn contact_blank_fields_become_none() {
        let contact = TeamContact {
            contact_person: Some("  ".to_string()),
            contact_phone: Some("".to_string()),
            contact_email: None,
        };

        let team = Team::new("Sporting", contact).unwrap();
        assert!(team.contact().contact_person.is_none());
        assert!(team.contact().contact_phone.is_none());
    }

    #[test]
    fn contact_phone_is_validated() {
        let contact = TeamContact {
            contact_phone: Some("bel mij".to_string()),
            ..TeamContact::default()
        };
        assert!(Team::new("Sporting", contact).is_err());

        let contact = TeamContact {
            contact_phone: Some("+32 470 12 34 56".to_string()),
            ..TeamContact::default()
        };
        assert!(Team::new("Sporting", contact).is_ok());
    }

    #[test]
    fn update_keeps_identity() {
        let mut team = Team::new("Old Name", TeamContact::default()).unwrap();
        let id = team.id();
        let created_at = team.created_at();

        team.update(
            "New Name",
            TeamContact {
                contact_person: Some("Jan".to_string()),
                ..TeamContact::default()
            },
        )
        .unwrap();

        assert_eq!(team.id(), id);
        assert_eq!(team.created_at(), created_at);
        assert_eq!(team.name(), "New Name");
        assert_eq!(team.contact().contact_person.as_deref(), Some("Jan"));
    }

    #[test]
    fn failed_update_leaves_team_untouched() {
        let mut team = Team::new("Keep Me", TeamContact::default()).unwrap();
        assert!(team.update("", TeamContact::default()).is_err());
        assert_eq!(team.name(), "Keep Me");
    }
}
