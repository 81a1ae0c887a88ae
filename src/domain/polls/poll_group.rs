use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::domain::matches::Match;

/// Minimum number of matches a poll group needs
pub const MIN_MATCHES_PER_GROUP: usize = 2;

/// A calendar month referees are polled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollMonth {
    year: i32,
    month: u32,
}

impl PollMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, String> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(format!("Invalid poll month {}-{}", year, month));
        }
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses `YYYY-MM`
    pub fn parse(value: &str) -> Result<Self, String> {
        let (year, month) = value
            .split_once('-')
            .ok_or_else(|| format!("Poll month must look like YYYY-MM, got {}", value))?;
        let year = year
            .parse()
            .map_err(|_| format!("Invalid year in poll month {}", value))?;
        let month = month
            .parse()
            .map_err(|_| format!("Invalid month in poll month {}", value))?;
        Self::new(year, month)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Half-open datetime range `[start, end)` covering the month
    pub fn range(&self) -> (NaiveDateTime, NaiveDateTime) {
        (
            self.first_day().and_time(NaiveTime::MIN),
            self.next().first_day().and_time(NaiveTime::MIN),
        )
    }
}

impl fmt::Display for PollMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Matches sharing a location and kickoff slot, polled together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollGroup {
    pub location: String,
    pub date: NaiveDate,
    pub kickoff: NaiveTime,
    pub match_ids: Vec<Uuid>,
}

/// Clusters unsubmitted matches by (location, date, kickoff)
///
/// Locations compare trimmed and case-insensitive; the first spelling seen
/// is kept for display. Groups with fewer than two matches are dropped.
/// Groups come out sorted by date, kickoff and location.
pub fn group_for_poll<'a>(matches: impl IntoIterator<Item = &'a Match>) -> Vec<PollGroup> {
    let mut slots: BTreeMap<(NaiveDate, NaiveTime, String), (String, Vec<&Match>)> =
        BTreeMap::new();

    for m in matches.into_iter().filter(|m| !m.is_submitted()) {
        let date_time = m.match_date();
        let kickoff = NaiveTime::from_hms_opt(date_time.hour(), date_time.minute(), 0)
            .unwrap_or(NaiveTime::MIN);
        let key = (
            date_time.date(),
            kickoff,
            m.location().trim().to_lowercase(),
        );
        slots
            .entry(key)
            .or_insert_with(|| (m.location().trim().to_string(), Vec::new()))
            .1
            .push(m);
    }

    slots
        .into_iter()
        .filter(|(_, (_, grouped))| grouped.len() >= MIN_MATCHES_PER_GROUP)
        .map(|((date, kickoff, _), (location, mut grouped))| {
            grouped.sort_by(|a, b| a.match_date().cmp(&b.match_date()).then(a.id().cmp(&b.id())));
            PollGroup {
                location,
                date,
                kickoff,
                match_ids: grouped.iter().map(|m| m.id()).collect(),
            }
        })
        .collect()
}

/// A referee's answer for one match of a poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefereeAvailability {
    pub id: Uuid,
    pub user_id: Uuid,
    pub match_id: Uuid,
    pub poll_month: String,
    pub is_available: bool,
    pub updated_at: DateTime<Utc>,
}

impl RefereeAvailability {
    pub fn new(user_id: Uuid, match_id: Uuid, poll_month: PollMonth, is_available: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            match_id,
            poll_month: poll_month.to_string(),
            is_available,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::matches::MatchForm;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn fixture(date: NaiveDateTime, location: &str) -> Match {
        Match::new(None, date, location, Uuid::new_v4(), Uuid::new_v4()).unwrap()
    }

    #[test]
    fn groups_matches_sharing_location_and_slot() {
        let a = fixture(at(4, 20, 0), "Sporthal Ter Beke");
        let b = fixture(at(4, 20, 0), " sporthal ter beke ");
        let lone = fixture(at(4, 21, 0), "Sporthal Ter Beke");
        let elsewhere = fixture(at(4, 20, 0), "De Brug");

        let groups = group_for_poll(&[a.clone(), b.clone(), lone, elsewhere]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].location, "Sporthal Ter Beke");
        assert_eq!(groups[0].kickoff, NaiveTime::from_hms_opt(20, 0, 0).unwrap());
        assert_eq!(groups[0].match_ids.len(), 2);
        assert!(groups[0].match_ids.contains(&a.id()));
        assert!(groups[0].match_ids.contains(&b.id()));
    }

    #[test]
    fn submitted_matches_are_not_polled() {
        let a = fixture(at(4, 20, 0), "Hal");
        let mut b = fixture(at(4, 20, 0), "Hal");
        b.submit(MatchForm::default()).unwrap();

        assert!(group_for_poll(&[a, b]).is_empty());
    }

    #[test]
    fn groups_sorted_chronologically() {
        let late = [fixture(at(11, 20, 0), "Hal"), fixture(at(11, 20, 0), "Hal")];
        let early = [fixture(at(4, 19, 30), "Hal"), fixture(at(4, 19, 30), "Hal")];
        let all: Vec<Match> = late.iter().chain(early.iter()).cloned().collect();

        let groups = group_for_poll(&all);

        assert_eq!(groups.len(), 2);
        assert!(groups[0].date < groups[1].date);
    }

    #[test]
    fn poll_month_parsing_and_range() {
        let month = PollMonth::parse("2024-12").unwrap();
        assert_eq!(month.to_string(), "2024-12");

        let (start, end) = month.range();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap().and_time(NaiveTime::MIN));
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_time(NaiveTime::MIN));
    }

    #[test]
    fn poll_month_rejects_garbage() {
        assert!(PollMonth::parse("2024").is_err());
        assert!(PollMonth::parse("2024-13").is_err());
        assert!(PollMonth::new(2024, 0).is_err());
    }
}
