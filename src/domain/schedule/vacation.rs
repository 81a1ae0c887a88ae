use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A span of days without league matches (school holidays, hall closures)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationPeriod {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
}

impl VacationPeriod {
    pub fn new(
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, String> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err("Vacation name cannot be empty".to_string());
        }
        if end_date < start_date {
            return Err("Vacation cannot end before it starts".to_string());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            start_date,
            end_date,
            is_active: true,
        })
    }

    /// Inclusive on both ends; inactive periods block nothing
    pub fn blocks(&self, date: NaiveDate) -> bool {
        self.is_active && date >= self.start_date && date <= self.end_date
    }
}
