// Repository interfaces (ports)
// Implemented by infrastructure adapters

pub mod errors;
pub mod finance_repository;
pub mod match_repository;
pub mod player_repository;
pub mod poll_repository;
pub mod settings_repository;
pub mod team_repository;
pub mod user_repository;

pub use errors::{RepositoryError, RepositoryResult};
pub use finance_repository::FinanceRepository;
pub use match_repository::MatchRepository;
pub use player_repository::PlayerRepository;
pub use poll_repository::PollRepository;
pub use settings_repository::SettingsRepository;
pub use team_repository::TeamRepository;
pub use user_repository::{PasswordResetToken, User, UserRepository};
