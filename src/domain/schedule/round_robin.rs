use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::vacation::VacationPeriod;
use crate::domain::matches::Match;

/// Longest gap between two kickoffs on one matchday
pub const MAX_SLOT_MINUTES: u32 = 24 * 60;

/// Parameters for a generated competition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub team_ids: Vec<Uuid>,
    /// Date of the first matchday; later matchdays follow weekly
    pub start_date: NaiveDate,
    pub first_kickoff: NaiveTime,
    pub slot_minutes: u32,
    pub location: String,
    /// Play every pairing twice, home and away swapped in the second half
    #[serde(default)]
    pub double_round: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledFixture {
    pub matchday: i32,
    pub match_date: NaiveDateTime,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
}

impl ScheduledFixture {
    pub fn into_match(self, location: &str) -> Result<Match, String> {
        Match::new(
            Some(self.matchday),
            self.match_date,
            location,
            self.home_team_id,
            self.away_team_id,
        )
    }
}

/// Generates a round-robin schedule with the circle method
///
/// An odd team count adds a bye, so one team rests each matchday.
/// Matchdays fall weekly from `start_date`; a week whose date lies inside
/// an active vacation period is skipped. Within a matchday, matches get
/// consecutive kickoff slots `slot_minutes` apart.
///
/// # Arguments
/// * `request` - Teams, start date, kickoff slots and location
/// * `vacations` - Periods whose weeks get no matchday
///
/// # Returns
/// * `Ok(Vec<ScheduledFixture>)` - Fixtures ordered by matchday and slot
/// * `Err(String)` - If the request is invalid or the schedule would run past the last representable date
pub fn generate_schedule(
    request: &ScheduleRequest,
    vacations: &[VacationPeriod],
) -> Result<Vec<ScheduledFixture>, String> {
    if request.team_ids.len() < 2 {
        return Err("A schedule needs at least two teams".to_string());
    }
    let distinct: HashSet<_> = request.team_ids.iter().collect();
    if distinct.len() != request.team_ids.len() {
        return Err("Each team can appear only once in a schedule".to_string());
    }
    if request.slot_minutes == 0 {
        return Err("Slot length must be at least one minute".to_string());
    }
    if request.slot_minutes > MAX_SLOT_MINUTES {
        return Err("Slot length cannot exceed one day".to_string());
    }
    if request.location.trim().is_empty() {
        return Err("Location cannot be empty".to_string());
    }

    let mut rounds = circle_rounds(&request.team_ids);
    if request.double_round {
        let mirrored: Vec<Vec<(Uuid, Uuid)>> = rounds
            .iter()
            .map(|round| round.iter().map(|(home, away)| (*away, *home)).collect())
            .collect();
        rounds.extend(mirrored);
    }

    let round_count = rounds.len();
    let mut fixtures = Vec::new();
    let mut date = request.start_date;
    for (index, round) in rounds.into_iter().enumerate() {
        while vacations.iter().any(|v| v.blocks(date)) {
            date = next_week(date)?;
        }

        let first_slot = date.and_time(request.first_kickoff);
        for (slot, (home, away)) in round.into_iter().enumerate() {
            let offset = i64::try_from(slot)
                .ok()
                .and_then(|slot| slot.checked_mul(i64::from(request.slot_minutes)))
                .map(Duration::minutes)
                .ok_or_else(out_of_range)?;
            fixtures.push(ScheduledFixture {
                matchday: index as i32 + 1,
                match_date: first_slot.checked_add_signed(offset).ok_or_else(out_of_range)?,
                home_team_id: home,
                away_team_id: away,
            });
        }

        if index + 1 < round_count {
            date = next_week(date)?;
        }
    }

    Ok(fixtures)
}

fn next_week(date: NaiveDate) -> Result<NaiveDate, String> {
    date.checked_add_signed(Duration::weeks(1))
        .ok_or_else(out_of_range)
}

fn out_of_range() -> String {
    "Schedule runs past the last supported date".to_string()
}

/// One list of (home, away) pairings per round, byes left out
fn circle_rounds(team_ids: &[Uuid]) -> Vec<Vec<(Uuid, Uuid)>> {
    let mut slots: Vec<Option<Uuid>> = team_ids.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();

    let mut rounds = Vec::with_capacity(n - 1);
    for round in 0..n - 1 {
        let mut pairings = Vec::with_capacity(n / 2);
        for i in 0..n / 2 {
            if let (Some(a), Some(b)) = (slots[i], slots[n - 1 - i]) {
                if (round + i) % 2 == 0 {
                    pairings.push((a, b));
                } else {
                    pairings.push((b, a));
                }
            }
        }
        rounds.push(pairings);
        slots[1..].rotate_right(1);
    }
    rounds
}
