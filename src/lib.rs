//! Minivoetbal League API Library
//!
//! Domain logic, repositories, services and the HTTP layer for running a
//! local indoor football league: teams, players, match forms, cards and
//! suspensions, team finances and referee polls.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod services;
