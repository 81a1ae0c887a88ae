// Repository implementations (data access layer)
// PostgreSQL adapters for the domain repository ports

pub mod postgres_finance_repository;
pub mod postgres_match_repository;
pub mod postgres_player_repository;
pub mod postgres_poll_repository;
pub mod postgres_settings_repository;
pub mod postgres_team_repository;
pub mod postgres_user_repository;

pub use postgres_finance_repository::PostgresFinanceRepository;
pub use postgres_match_repository::PostgresMatchRepository;
pub use postgres_player_repository::PostgresPlayerRepository;
pub use postgres_poll_repository::PostgresPollRepository;
pub use postgres_settings_repository::PostgresSettingsRepository;
pub use postgres_team_repository::PostgresTeamRepository;
pub use postgres_user_repository::PostgresUserRepository;
