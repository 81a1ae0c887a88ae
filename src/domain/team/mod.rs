// Team domain module
// Contains the team entity and its contact details

#![allow(clippy::module_inception)]

pub mod team;

pub use team::{Team, TeamContact};
