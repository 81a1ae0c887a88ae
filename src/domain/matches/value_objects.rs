use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Disciplinary outcome recorded for a player in a single match
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "card_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    #[default]
    None,
    Yellow,
    DoubleYellow,
    Red,
}

impl CardType {
    pub fn label(&self) -> &'static str {
        match self {
            CardType::None => "geen kaart",
            CardType::Yellow => "gele kaart",
            CardType::DoubleYellow => "dubbele gele kaart",
            CardType::Red => "rode kaart",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardType::None => write!(f, "none"),
            CardType::Yellow => write!(f, "yellow"),
            CardType::DoubleYellow => write!(f, "double_yellow"),
            CardType::Red => write!(f, "red"),
        }
    }
}

/// One player's line on a match form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupEntry {
    pub player_id: Uuid,
    #[serde(default)]
    pub card: CardType,
    #[serde(default)]
    pub goals: u32,
}

impl LineupEntry {
    pub fn new(player_id: Uuid) -> Self {
        Self {
            player_id,
            card: CardType::None,
            goals: 0,
        }
    }

    pub fn with_card(mut self, card: CardType) -> Self {
        self.card = card;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

/// Where a match form stands in its lifecycle
///
/// ```text
/// Scheduled -> Submitted -> Locked
///                  ^           |
///                  +-- unlock -+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Submitted,
    Locked,
}

impl MatchStatus {
    pub fn from_flags(is_submitted: bool, is_locked: bool) -> Self {
        match (is_submitted, is_locked) {
            (_, true) => MatchStatus::Locked,
            (true, false) => MatchStatus::Submitted,
            (false, false) => MatchStatus::Scheduled,
        }
    }
}
