use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::matches::{CardType, Match};

/// Maps a range of accumulated yellow cards to suspension matches
///
/// `max_cards` of `None` means "and above".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspensionRule {
    pub min_cards: u32,
    pub max_cards: Option<u32>,
    pub suspension_matches: u32,
}

impl SuspensionRule {
    pub fn contains(&self, cards: u32) -> bool {
        cards >= self.min_cards && self.max_cards.map_or(true, |max| cards <= max)
    }
}

/// Upper bound for any single suspension length
pub const MAX_SUSPENSION_MATCHES: u32 = 100;

/// League suspension rules, admin-editable
///
/// # Invariants (checked by [`SuspensionRules::validate`])
/// - Every rule has `min_cards >= 1` and `min_cards <= max_cards`
/// - Ranges do not overlap
/// - Only the rule with the highest minimum may be open-ended
/// - No suspension exceeds [`MAX_SUSPENSION_MATCHES`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspensionRules {
    pub yellow_card_rules: Vec<SuspensionRule>,
    pub red_card_suspension: u32,
}

impl Default for SuspensionRules {
    fn default() -> Self {
        Self {
            yellow_card_rules: vec![
                SuspensionRule {
                    min_cards: 2,
                    max_cards: Some(3),
                    suspension_matches: 1,
                },
                SuspensionRule {
                    min_cards: 4,
                    max_cards: Some(5),
                    suspension_matches: 2,
                },
                SuspensionRule {
                    min_cards: 6,
                    max_cards: None,
                    suspension_matches: 3,
                },
            ],
            red_card_suspension: 1,
        }
    }
}

impl SuspensionRules {
    /// Checks the invariants and returns the rules sorted by minimum
    pub fn validate(mut self) -> Result<Self, String> {
        self.yellow_card_rules.sort_by_key(|rule| rule.min_cards);

        if self.red_card_suspension > MAX_SUSPENSION_MATCHES {
            return Err(format!(
                "A red card suspension cannot exceed {} matches",
                MAX_SUSPENSION_MATCHES
            ));
        }
        for rule in &self.yellow_card_rules {
            if rule.suspension_matches > MAX_SUSPENSION_MATCHES {
                return Err(format!(
                    "A suspension cannot exceed {} matches",
                    MAX_SUSPENSION_MATCHES
                ));
            }
            if rule.min_cards == 0 {
                return Err("A suspension rule must start at one card or more".to_string());
            }
            if let Some(max) = rule.max_cards {
                if max < rule.min_cards {
                    return Err(format!(
                        "Suspension rule {}-{} has its maximum below its minimum",
                        rule.min_cards, max
                    ));
                }
            }
        }

        for pair in self.yellow_card_rules.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            match current.max_cards {
                None => {
                    return Err(format!(
                        "Open-ended rule from {} cards must be the last rule",
                        current.min_cards
                    ))
                }
                Some(max) if max >= next.min_cards => {
                    return Err(format!(
                        "Suspension rules overlap at {} cards",
                        next.min_cards
                    ))
                }
                Some(_) => {}
            }
        }

        Ok(self)
    }

    /// Suspension matches for an accumulated yellow card count
    ///
    /// # Example
    /// ```
    /// use minivoetbal_api::domain::suspension::SuspensionRules;
    ///
    /// let rules = SuspensionRules::default();
    /// assert_eq!(rules.suspension_for_yellow(1), 0);
    /// assert_eq!(rules.suspension_for_yellow(3), 1);
    /// assert_eq!(rules.suspension_for_yellow(9), 3);
    /// ```
    pub fn suspension_for_yellow(&self, yellow_cards: u32) -> u32 {
        self.yellow_card_rules
            .iter()
            .find(|rule| rule.contains(yellow_cards))
            .map_or(0, |rule| rule.suspension_matches)
    }

    /// Total suspension for a tally, saturating at `u32::MAX`
    pub fn suspension_for(&self, tally: CardTally) -> u32 {
        self.suspension_for_yellow(tally.yellow_cards)
            .saturating_add(tally.red_cards.saturating_mul(self.red_card_suspension))
    }
}

/// Cards a player collected over a set of matches
///
/// A double yellow ends in a sending-off and counts as a red card, not as
/// two yellows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CardTally {
    pub yellow_cards: u32,
    pub red_cards: u32,
}

impl CardTally {
    /// Tallies cards from submitted matches only
    pub fn for_player<'a>(player_id: Uuid, matches: impl IntoIterator<Item = &'a Match>) -> Self {
        let mut tally = CardTally::default();
        for m in matches.into_iter().filter(|m| m.is_submitted()) {
            match m.card_for(player_id) {
                Some(CardType::Yellow) => tally.yellow_cards += 1,
                Some(CardType::DoubleYellow) | Some(CardType::Red) => tally.red_cards += 1,
                Some(CardType::None) | None => {}
            }
        }
        tally
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuspensionStatus {
    pub player_id: Uuid,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub suspension_matches: u32,
}

impl SuspensionStatus {
    pub fn evaluate(player_id: Uuid, tally: CardTally, rules: &SuspensionRules) -> Self {
        Self {
            player_id,
            yellow_cards: tally.yellow_cards,
            red_cards: tally.red_cards,
            suspension_matches: rules.suspension_for(tally),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::matches::{LineupEntry, MatchForm};
    use chrono::NaiveDate;

    fn rule(min: u32, max: Option<u32>, matches: u32) -> SuspensionRule {
        SuspensionRule {
            min_cards: min,
            max_cards: max,
            suspension_matches: matches,
        }
    }

    #[test]
    fn default_yellow_ranges() {
        let rules = SuspensionRules::default();
        assert_eq!(rules.suspension_for_yellow(0), 0);
        assert_eq!(rules.suspension_for_yellow(1), 0);
        assert_eq!(rules.suspension_for_yellow(2), 1);
        assert_eq!(rules.suspension_for_yellow(3), 1);
        assert_eq!(rules.suspension_for_yellow(4), 2);
        assert_eq!(rules.suspension_for_yellow(5), 2);
        assert_eq!(rules.suspension_for_yellow(6), 3);
        assert_eq!(rules.suspension_for_yellow(40), 3);
    }

    #[test]
    fn red_cards_add_fixed_default() {
        let rules = SuspensionRules::default();
        let tally = CardTally {
            yellow_cards: 2,
            red_cards: 2,
        };
        assert_eq!(rules.suspension_for(tally), 3);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(SuspensionRules::default().validate().is_ok());
    }

    #[test]
    fn validate_sorts_rules() {
        let rules = SuspensionRules {
            yellow_card_rules: vec![rule(5, None, 2), rule(3, Some(4), 1)],
            red_card_suspension: 2,
        }
        .validate()
        .unwrap();

        assert_eq!(rules.yellow_card_rules[0].min_cards, 3);
    }

    #[test]
    fn overlapping_rules_rejected() {
        let rules = SuspensionRules {
            yellow_card_rules: vec![rule(2, Some(4), 1), rule(4, None, 2)],
            red_card_suspension: 1,
        };
        assert!(rules.validate().unwrap_err().contains("overlap"));
    }

    #[test]
    fn open_ended_rule_must_be_last() {
        let rules = SuspensionRules {
            yellow_card_rules: vec![rule(2, None, 1), rule(6, Some(8), 2)],
            red_card_suspension: 1,
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn inverted_range_rejected() {
        let rules = SuspensionRules {
            yellow_card_rules: vec![rule(5, Some(3), 1)],
            red_card_suspension: 1,
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn zero_minimum_rejected() {
        let rules = SuspensionRules {
            yellow_card_rules: vec![rule(0, Some(1), 1)],
            red_card_suspension: 1,
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn oversized_suspensions_rejected() {
        let long_red = SuspensionRules {
            yellow_card_rules: vec![rule(2, None, 1)],
            red_card_suspension: MAX_SUSPENSION_MATCHES + 1,
        };
        let long_yellow = SuspensionRules {
            yellow_card_rules: vec![rule(2, None, u32::MAX)],
            red_card_suspension: 1,
        };
        assert!(long_red.validate().is_err());
        assert!(long_yellow.validate().is_err());
    }

    #[test]
    fn huge_tallies_saturate_instead_of_overflowing() {
        let rules = SuspensionRules {
            yellow_card_rules: vec![rule(1, None, u32::MAX)],
            red_card_suspension: u32::MAX,
        };
        let tally = CardTally {
            yellow_cards: u32::MAX,
            red_cards: u32::MAX,
        };
        assert_eq!(rules.suspension_for(tally), u32::MAX);
        assert_eq!(
            SuspensionRules::default().suspension_for(CardTally { yellow_cards: 0, red_cards: u32::MAX }),
            u32::MAX
        );
    }

    #[test]
    fn tally_counts_submitted_matches_only() {
        let player = Uuid::new_v4();
        let kickoff = NaiveDate::from_ymd_opt(2024, 1, 8)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        let booked = |card: CardType| {
            let mut m = Match::new(None, kickoff, "Hal", Uuid::new_v4(), Uuid::new_v4()).unwrap();
            m.submit(MatchForm {
                home_players: vec![LineupEntry::new(player).with_card(card)],
                ..MatchForm::default()
            })
            .unwrap();
            m
        };
        let unplayed = Match::new(None, kickoff, "Hal", Uuid::new_v4(), Uuid::new_v4()).unwrap();

        let matches = vec![
            booked(CardType::Yellow),
            booked(CardType::Yellow),
            booked(CardType::DoubleYellow),
            booked(CardType::None),
            unplayed,
        ];

        let tally = CardTally::for_player(player, &matches);
        assert_eq!(
            tally,
            CardTally {
                yellow_cards: 2,
                red_cards: 1
            }
        );

        let status = SuspensionStatus::evaluate(player, tally, &SuspensionRules::default());
        assert_eq!(status.suspension_matches, 2);
    }
}
