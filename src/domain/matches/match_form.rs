use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use super::value_objects::{CardType, LineupEntry, MatchStatus, Side};

/// What a referee or admin fills in after the final whistle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchForm {
    pub home_score: i32,
    pub away_score: i32,
    #[serde(default)]
    pub home_players: Vec<LineupEntry>,
    #[serde(default)]
    pub away_players: Vec<LineupEntry>,
    pub referee: Option<String>,
    pub referee_notes: Option<String>,
}

/// A scheduled league match and its match form
///
/// # Invariants
/// - Home and away team differ
/// - Location is never empty
/// - A locked form cannot be changed
/// - A player appears at most once across both lineups
#[derive(Debug, Clone)]
pub struct Match {
    id: Uuid,
    matchday: Option<i32>,
    match_date: NaiveDateTime,
    location: String,
    home_team_id: Uuid,
    away_team_id: Uuid,
    home_score: Option<i32>,
    away_score: Option<i32>,
    home_players: Vec<LineupEntry>,
    away_players: Vec<LineupEntry>,
    referee: Option<String>,
    referee_notes: Option<String>,
    is_submitted: bool,
    is_locked: bool,
}

impl Match {
    pub fn new(
        matchday: Option<i32>,
        match_date: NaiveDateTime,
        location: impl Into<String>,
        home_team_id: Uuid,
        away_team_id: Uuid,
    ) -> Result<Self, String> {
        if home_team_id == away_team_id {
            return Err("A team cannot play against itself".to_string());
        }
        let location = location.into().trim().to_string();
        if location.is_empty() {
            return Err("Location cannot be empty".to_string());
        }
        if matches!(matchday, Some(day) if day < 1) {
            return Err("Matchday must be at least 1".to_string());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            matchday,
            match_date,
            location,
            home_team_id,
            away_team_id,
            home_score: None,
            away_score: None,
            home_players: Vec::new(),
            away_players: Vec::new(),
            referee: None,
            referee_notes: None,
            is_submitted: false,
            is_locked: false,
        })
    }

    /// Records score, lineups and cards and marks the form submitted
    ///
    /// Re-submitting an already submitted form overwrites it as long as it
    /// is not locked.
    pub fn submit(&mut self, form: MatchForm) -> Result<(), String> {
        if self.is_locked {
            return Err("Match form is locked".to_string());
        }
        if form.home_score < 0 || form.away_score < 0 {
            return Err("Scores cannot be negative".to_string());
        }

        let mut seen = HashSet::new();
        for entry in form.home_players.iter().chain(form.away_players.iter()) {
            if !seen.insert(entry.player_id) {
                return Err(format!(
                    "Player {} appears more than once on the match form",
                    entry.player_id
                ));
            }
        }

        self.home_score = Some(form.home_score);
        self.away_score = Some(form.away_score);
        self.home_players = form.home_players;
        self.away_players = form.away_players;
        self.referee = form.referee.or(self.referee.take());
        self.referee_notes = form.referee_notes;
        self.is_submitted = true;
        Ok(())
    }

    pub fn lock(&mut self) -> Result<(), String> {
        match self.status() {
            MatchStatus::Submitted => {
                self.is_locked = true;
                Ok(())
            }
            MatchStatus::Scheduled => Err("Only submitted match forms can be locked".to_string()),
            MatchStatus::Locked => Err("Match form is already locked".to_string()),
        }
    }

    pub fn unlock(&mut self) -> Result<(), String> {
        if !self.is_locked {
            return Err("Match form is not locked".to_string());
        }
        self.is_locked = false;
        Ok(())
    }

    /// Moves a match that has not been played yet
    pub fn reschedule(
        &mut self,
        match_date: NaiveDateTime,
        location: impl Into<String>,
    ) -> Result<(), String> {
        if self.is_submitted {
            return Err("A submitted match cannot be rescheduled".to_string());
        }
        let location = location.into().trim().to_string();
        if location.is_empty() {
            return Err("Location cannot be empty".to_string());
        }
        self.match_date = match_date;
        self.location = location;
        Ok(())
    }

    pub fn assign_referee(&mut self, referee: Option<String>) -> Result<(), String> {
        if self.is_locked {
            return Err("Match form is locked".to_string());
        }
        self.referee = referee
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        Ok(())
    }

    pub fn status(&self) -> MatchStatus {
        MatchStatus::from_flags(self.is_submitted, self.is_locked)
    }

    pub fn team_id(&self, side: Side) -> Uuid {
        match side {
            Side::Home => self.home_team_id,
            Side::Away => self.away_team_id,
        }
    }

    pub fn lineup(&self, side: Side) -> &[LineupEntry] {
        match side {
            Side::Home => &self.home_players,
            Side::Away => &self.away_players,
        }
    }

    /// Number of players per card type on one side, cards of type none excluded
    pub fn card_counts(&self, side: Side) -> BTreeMap<CardType, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.lineup(side) {
            if entry.card != CardType::None {
                *counts.entry(entry.card).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Card received by a player in this match, if the player was lined up
    pub fn card_for(&self, player_id: Uuid) -> Option<CardType> {
        self.home_players
            .iter()
            .chain(self.away_players.iter())
            .find(|entry| entry.player_id == player_id)
            .map(|entry| entry.card)
    }

    pub fn involves_team(&self, team_id: Uuid) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn matchday(&self) -> Option<i32> {
        self.matchday
    }

    pub fn match_date(&self) -> NaiveDateTime {
        self.match_date
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn home_team_id(&self) -> Uuid {
        self.home_team_id
    }

    pub fn away_team_id(&self) -> Uuid {
        self.away_team_id
    }

    pub fn home_score(&self) -> Option<i32> {
        self.home_score
    }

    pub fn away_score(&self) -> Option<i32> {
        self.away_score
    }

    pub fn referee(&self) -> Option<&str> {
        self.referee.as_deref()
    }

    pub fn referee_notes(&self) -> Option<&str> {
        self.referee_notes.as_deref()
    }

    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    /// Reconstructs a Match from persistence layer data
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        matchday: Option<i32>,
        match_date: NaiveDateTime,
        location: String,
        home_team_id: Uuid,
        away_team_id: Uuid,
        home_score: Option<i32>,
        away_score: Option<i32>,
        home_players: Vec<LineupEntry>,
        away_players: Vec<LineupEntry>,
        referee: Option<String>,
        referee_notes: Option<String>,
        is_submitted: bool,
        is_locked: bool,
    ) -> Self {
        Self {
            id,
            matchday,
            match_date,
            location,
            home_team_id,
            away_team_id,
            home_score,
            away_score,
            home_players,
            away_players,
            referee,
            referee_notes,
            is_submitted,
            is_locked,
        }
    }
}
