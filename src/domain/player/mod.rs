// Player domain module

#![allow(clippy::module_inception)]

pub mod player;

pub use player::Player;
