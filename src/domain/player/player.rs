use chrono::{NaiveDate, Utc};
use uuid::Uuid;

/// A player registered on a team
///
/// # Invariants
/// - First and last name are trimmed and never empty
/// - Birth date, when known, is not in the future
#[derive(Debug, Clone)]
pub struct Player {
    id: Uuid,
    team_id: Uuid,
    first_name: String,
    last_name: String,
    birth_date: Option<NaiveDate>,
    is_active: bool,
}

impl Player {
    pub fn new(
        team_id: Uuid,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: Option<NaiveDate>,
    ) -> Result<Self, String> {
        let first_name = required("First name", first_name.into())?;
        let last_name = required("Last name", last_name.into())?;
        validate_birth_date(birth_date)?;

        Ok(Self {
            id: Uuid::new_v4(),
            team_id,
            first_name,
            last_name,
            birth_date,
            is_active: true,
        })
    }

    /// Applies an edit from a team manager
    ///
    /// Moving a player to another team is allowed; the caller checks that
    /// the editor may manage both teams.
    pub fn update(
        &mut self,
        team_id: Uuid,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: Option<NaiveDate>,
        is_active: bool,
    ) -> Result<(), String> {
        let first_name = required("First name", first_name.into())?;
        let last_name = required("Last name", last_name.into())?;
        validate_birth_date(birth_date)?;

        self.team_id = team_id;
        self.first_name = first_name;
        self.last_name = last_name;
        self.birth_date = birth_date;
        self.is_active = is_active;
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn team_id(&self) -> Uuid {
        self.team_id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn from_persistence(
        id: Uuid,
        team_id: Uuid,
        first_name: String,
        last_name: String,
        birth_date: Option<NaiveDate>,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            team_id,
            first_name,
            last_name,
            birth_date,
            is_active,
        }
    }
}

fn required(field: &str, value: String) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    Ok(trimmed.to_string())
}

fn validate_birth_date(birth_date: Option<NaiveDate>) -> Result<(), String> {
    match birth_date {
        Some(date) if date > Utc::now().date_naive() => {
            Err(format!("Birth date {} lies in the future", date))
        }
        _ => Ok(()),
    }
}
