// Suspension domain module
// Card-count to suspension-match rules

pub mod rules;

pub use rules::{
    CardTally, SuspensionRule, SuspensionRules, SuspensionStatus, MAX_SUSPENSION_MATCHES,
};
