// Application services
// Orchestration over repositories that more than one handler needs

pub mod charges;
pub mod email;
pub mod retry;
pub mod suspensions;
