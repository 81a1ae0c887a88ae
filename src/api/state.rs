use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::domain::repositories::{
    FinanceRepository, MatchRepository, PlayerRepository, PollRepository, SettingsRepository,
    TeamRepository, UserRepository,
};
use crate::infrastructure::repositories::{
    PostgresFinanceRepository, PostgresMatchRepository, PostgresPlayerRepository,
    PostgresPollRepository, PostgresSettingsRepository, PostgresTeamRepository,
    PostgresUserRepository,
};
use crate::services::charges::ChargeSync;
use crate::services::email::{EmailError, EmailSender, HttpEmailSender, LogEmailSender};
use crate::services::suspensions::SuspensionRuleCache;

/// The repository ports the handlers work against
#[derive(Clone)]
pub struct Repositories {
    pub teams: Arc<dyn TeamRepository>,
    pub players: Arc<dyn PlayerRepository>,
    pub matches: Arc<dyn MatchRepository>,
    pub finance: Arc<dyn FinanceRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub polls: Arc<dyn PollRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            teams: Arc::new(PostgresTeamRepository::new(pool.clone())),
            players: Arc::new(PostgresPlayerRepository::new(pool.clone())),
            matches: Arc::new(PostgresMatchRepository::new(pool.clone())),
            finance: Arc::new(PostgresFinanceRepository::new(pool.clone())),
            settings: Arc::new(PostgresSettingsRepository::new(pool.clone())),
            polls: Arc::new(PostgresPollRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool)),
        }
    }
}

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub email: Arc<dyn EmailSender>,
    pub suspension_rules: Arc<SuspensionRuleCache>,
    pub jwt_secret: Arc<str>,
    pub app_url: Arc<str>,
}

impl AppState {
    pub fn new(repos: Repositories, email: Arc<dyn EmailSender>, config: &AppConfig) -> Self {
        let suspension_rules = Arc::new(SuspensionRuleCache::new(
            repos.settings.clone(),
            config.suspension_cache_ttl,
        ));

        Self {
            repos,
            email,
            suspension_rules,
            jwt_secret: Arc::from(config.jwt_secret.as_str()),
            app_url: Arc::from(config.app_url.as_str()),
        }
    }

    /// Email sender from config: the HTTP API when a key is set, the log otherwise
    pub fn email_sender(config: &AppConfig) -> Result<Arc<dyn EmailSender>, EmailError> {
        let sender: Arc<dyn EmailSender> = match &config.email_api_key {
            Some(key) => Arc::new(HttpEmailSender::new(
                config.email_api_url.clone(),
                key.clone(),
                config.email_from.clone(),
            )?),
            None => Arc::new(LogEmailSender),
        };
        Ok(sender)
    }

    pub fn charge_sync(&self) -> ChargeSync {
        ChargeSync::new(self.repos.matches.clone(), self.repos.finance.clone())
    }
}
