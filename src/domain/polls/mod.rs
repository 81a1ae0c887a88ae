// Referee poll domain module
// Groups a month's matches by location and time slot for availability polls

pub mod poll_group;

pub use poll_group::{group_for_poll, PollGroup, PollMonth, RefereeAvailability};
