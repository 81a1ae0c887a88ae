//! League table computed from submitted match forms.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

use super::matches::Match;
use super::team::Team;

pub const POINTS_FOR_WIN: i32 = 3;
pub const POINTS_FOR_DRAW: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    pub team_id: Uuid,
    pub team_name: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_difference: i32,
    pub points: i32,
}

impl StandingRow {
    fn empty(team: &Team) -> Self {
        Self {
            team_id: team.id(),
            team_name: team.name().to_string(),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }

    fn record(&mut self, scored: i32, conceded: i32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        self.goal_difference = self.goals_for - self.goals_against;
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.won += 1;
                self.points += POINTS_FOR_WIN;
            }
            Ordering::Equal => {
                self.drawn += 1;
                self.points += POINTS_FOR_DRAW;
            }
            Ordering::Less => self.lost += 1,
        }
    }
}

/// Ranking order: points, goal difference, goals scored, then name
pub fn compare_rows(a: &StandingRow, b: &StandingRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.goal_difference.cmp(&a.goal_difference))
        .then(b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.team_name.to_lowercase().cmp(&b.team_name.to_lowercase()))
}

/// Builds the table for all teams; matches without both scores are ignored
pub fn compute_standings(teams: &[Team], matches: &[Match]) -> Vec<StandingRow> {
    let mut rows: HashMap<Uuid, StandingRow> = teams
        .iter()
        .map(|team| (team.id(), StandingRow::empty(team)))
        .collect();

    for m in matches.iter().filter(|m| m.is_submitted()) {
        let (Some(home), Some(away)) = (m.home_score(), m.away_score()) else {
            continue;
        };
        if let Some(row) = rows.get_mut(&m.home_team_id()) {
            row.record(home, away);
        }
        if let Some(row) = rows.get_mut(&m.away_team_id()) {
            row.record(away, home);
        }
    }

    let mut table: Vec<StandingRow> = rows.into_values().collect();
    table.sort_by(compare_rows);
    table
}
