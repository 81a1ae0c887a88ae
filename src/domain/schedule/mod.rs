// Schedule domain module
// Round-robin fixture generation around vacation periods

pub mod round_robin;
pub mod vacation;

pub use round_robin::{generate_schedule, ScheduleRequest, ScheduledFixture};
pub use vacation::VacationPeriod;
