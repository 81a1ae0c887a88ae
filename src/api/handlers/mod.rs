pub mod auth;
pub mod finance;
pub mod matches;
pub mod players;
pub mod polls;
pub mod schedule;
pub mod settings;
pub mod teams;
pub mod users;
