// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of infrastructure concerns

pub mod finance;
pub mod matches;
pub mod player;
pub mod polls;
pub mod repositories;
pub mod schedule;
pub mod settings;
pub mod standings;
pub mod suspension;
pub mod team;
pub mod user;
