// Match domain module
// Match forms: schedule slot, lineups, cards, score and submission state

pub mod match_form;
pub mod value_objects;

pub use match_form::{Match, MatchForm};
pub use value_objects::{CardType, LineupEntry, MatchStatus, Side};
