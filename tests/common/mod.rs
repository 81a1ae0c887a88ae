//! In-memory adapters and request helpers shared by the HTTP tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDateTime;
use serde_json::Value;
use tower::util::ServiceExt; // for oneshot
use uuid::Uuid;

use minivoetbal_api::api::{build_router, AppState, Repositories};
use minivoetbal_api::auth::jwt::create_token;
use minivoetbal_api::auth::password::hash_password;
use minivoetbal_api::config::AppConfig;
use minivoetbal_api::domain::finance::{
    ChargeScope, CostSetting, ExistingCharge, MatchReconciliation, ReconciliationPlan, Transaction,
};
use minivoetbal_api::domain::matches::{Match, Side};
use minivoetbal_api::domain::player::Player;
use minivoetbal_api::domain::polls::RefereeAvailability;
use minivoetbal_api::domain::repositories::{
    FinanceRepository, MatchRepository, PasswordResetToken, PlayerRepository, PollRepository,
    RepositoryError, RepositoryResult, SettingsRepository, TeamRepository, User, UserRepository,
};
use minivoetbal_api::domain::schedule::VacationPeriod;
use minivoetbal_api::domain::settings::TabVisibility;
use minivoetbal_api::domain::team::Team;
use minivoetbal_api::domain::user::value_objects::{Email, Role};
use minivoetbal_api::services::email::{EmailError, EmailMessage, EmailSender};

pub const TEST_SECRET: &str = "test-secret-key-for-integration-tests";
pub const TEST_APP_URL: &str = "https://portal.test";

#[derive(Default)]
pub struct MemoryTeams {
    teams: Mutex<Vec<Team>>,
}

#[async_trait]
impl TeamRepository for MemoryTeams {
    async fn save(&self, team: &Team) -> RepositoryResult<()> {
        let mut teams = self.teams.lock().unwrap();
        let duplicate = teams
            .iter()
            .any(|t| t.id() != team.id() && t.name() == team.name());
        if duplicate {
            return Err(RepositoryError::Conflict(
                "duplicate key value violates unique constraint \"teams_name_key\"".to_string(),
            ));
        }
        teams.retain(|t| t.id() != team.id());
        teams.push(team.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Team>> {
        Ok(self.teams.lock().unwrap().iter().find(|t| t.id() == id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Team>> {
        let mut teams = self.teams.lock().unwrap().clone();
        teams.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(teams)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut teams = self.teams.lock().unwrap();
        let before = teams.len();
        teams.retain(|t| t.id() != id);
        if teams.len() == before {
            return Err(RepositoryError::NotFound(format!("Team {}", id)));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPlayers {
    players: Mutex<Vec<Player>>,
}

#[async_trait]
impl PlayerRepository for MemoryPlayers {
    async fn save(&self, player: &Player) -> RepositoryResult<()> {
        let mut players = self.players.lock().unwrap();
        players.retain(|p| p.id() != player.id());
        players.push(player.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Player>> {
        Ok(self.players.lock().unwrap().iter().find(|p| p.id() == id).cloned())
    }

    async fn find_by_team(&self, team_id: Uuid) -> RepositoryResult<Vec<Player>> {
        Ok(self
            .players
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.team_id() == team_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut players = self.players.lock().unwrap();
        let before = players.len();
        players.retain(|p| p.id() != id);
        if players.len() == before {
            return Err(RepositoryError::NotFound(format!("Player {}", id)));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryMatches {
    matches: Mutex<Vec<Match>>,
}

#[async_trait]
impl MatchRepository for MemoryMatches {
    async fn save(&self, m: &Match) -> RepositoryResult<()> {
        let mut matches = self.matches.lock().unwrap();
        matches.retain(|existing| existing.id() != m.id());
        matches.push(m.clone());
        Ok(())
    }

    async fn save_all(&self, matches: &[Match]) -> RepositoryResult<()> {
        for m in matches {
            self.save(m).await?;
        }
        Ok(())
    }

    async fn save_form(&self, m: &Match) -> RepositoryResult<bool> {
        let mut matches = self.matches.lock().unwrap();
        match matches.iter_mut().find(|stored| stored.id() == m.id()) {
            Some(stored) if !stored.is_locked() => {
                *stored = Match::from_persistence(
                    stored.id(),
                    stored.matchday(),
                    stored.match_date(),
                    stored.location().to_string(),
                    stored.home_team_id(),
                    stored.away_team_id(),
                    m.home_score(),
                    m.away_score(),
                    m.lineup(Side::Home).to_vec(),
                    m.lineup(Side::Away).to_vec(),
                    m.referee().map(str::to_string),
                    m.referee_notes().map(str::to_string),
                    true,
                    false,
                );
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_locked(&self, id: Uuid, locked: bool) -> RepositoryResult<bool> {
        let mut matches = self.matches.lock().unwrap();
        let Some(stored) = matches.iter_mut().find(|m| m.id() == id) else {
            return Ok(false);
        };
        let changed = if locked { stored.lock() } else { stored.unlock() };
        Ok(changed.is_ok())
    }

    async fn save_schedule(&self, m: &Match) -> RepositoryResult<bool> {
        let mut matches = self.matches.lock().unwrap();
        let Some(stored) = matches.iter_mut().find(|stored| stored.id() == m.id()) else {
            return Ok(false);
        };
        let moved = stored.match_date() != m.match_date() || stored.location() != m.location();
        if stored.is_locked() || (stored.is_submitted() && moved) {
            return Ok(false);
        }
        if moved {
            stored.reschedule(m.match_date(), m.location()).unwrap();
        }
        stored.assign_referee(m.referee().map(str::to_string)).unwrap();
        Ok(true)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Match>> {
        Ok(self.matches.lock().unwrap().iter().find(|m| m.id() == id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Match>> {
        let mut matches = self.matches.lock().unwrap().clone();
        matches.sort_by_key(|m| m.match_date());
        Ok(matches)
    }

    async fn find_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<Match>> {
        let all = self.find_all().await?;
        Ok(all
            .into_iter()
            .filter(|m| m.match_date() >= start && m.match_date() < end)
            .collect())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut matches = self.matches.lock().unwrap();
        let before = matches.len();
        matches.retain(|m| m.id() != id);
        if matches.len() == before {
            return Err(RepositoryError::NotFound(format!("Match {}", id)));
        }
        Ok(())
    }
}

pub struct MemoryFinance {
    matches: Arc<MemoryMatches>,
    costs: Mutex<Vec<CostSetting>>,
    pub transactions: Mutex<Vec<Transaction>>,
}

impl MemoryFinance {
    pub fn new(matches: Arc<MemoryMatches>) -> Self {
        Self {
            matches,
            costs: Mutex::new(Vec::new()),
            transactions: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl FinanceRepository for MemoryFinance {
    async fn save_cost_setting(&self, setting: &CostSetting) -> RepositoryResult<()> {
        let mut costs = self.costs.lock().unwrap();
        costs.retain(|c| c.id != setting.id);
        costs.push(setting.clone());
        Ok(())
    }

    async fn find_cost_settings(&self) -> RepositoryResult<Vec<CostSetting>> {
        Ok(self.costs.lock().unwrap().clone())
    }

    async fn find_cost_setting(&self, id: Uuid) -> RepositoryResult<Option<CostSetting>> {
        Ok(self.costs.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn delete_cost_setting(&self, id: Uuid) -> RepositoryResult<()> {
        let mut costs = self.costs.lock().unwrap();
        let before = costs.len();
        costs.retain(|c| c.id != id);
        if costs.len() == before {
            return Err(RepositoryError::NotFound(format!("Cost setting {}", id)));
        }
        Ok(())
    }

    async fn create_transaction(&self, transaction: &Transaction) -> RepositoryResult<()> {
        self.transactions.lock().unwrap().push(transaction.clone());
        Ok(())
    }

    async fn find_transactions_by_team(&self, team_id: Uuid) -> RepositoryResult<Vec<Transaction>> {
        let mut rows: Vec<Transaction> = self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.team_id == team_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date).then(b.created_at.cmp(&a.created_at)));
        Ok(rows)
    }

    async fn delete_transaction(&self, id: Uuid) -> RepositoryResult<()> {
        let mut rows = self.transactions.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| t.id != id);
        if rows.len() == before {
            return Err(RepositoryError::NotFound(format!("Transaction {}", id)));
        }
        Ok(())
    }

    async fn reconcile_match_charges(
        &self,
        match_id: Uuid,
        scope: ChargeScope,
    ) -> RepositoryResult<MatchReconciliation> {
        // The transactions mutex stands in for the row lock; the match is read while it is held
        let mut rows = self.transactions.lock().unwrap();
        let m = self
            .matches
            .matches
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id() == match_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("Match {}", match_id)))?;
        let settings = self.costs.lock().unwrap().clone();
        let existing: Vec<ExistingCharge> = rows
            .iter()
            .filter(|t| t.match_id == Some(match_id) && t.transaction_type == scope.transaction_type())
            .filter_map(ExistingCharge::from_transaction)
            .collect();

        let (plan, unmapped_cards) = ReconciliationPlan::for_match(scope, &m, &settings, &existing);
        rows.retain(|t| !plan.deletes.contains(&t.id));
        rows.extend(plan.inserts.iter().cloned());
        Ok(MatchReconciliation {
            outcome: plan.outcome(),
            unmapped_cards,
        })
    }
}

#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<Vec<(String, Value)>>,
    tabs: Mutex<Vec<TabVisibility>>,
    vacations: Mutex<Vec<VacationPeriod>>,
}

#[async_trait]
impl SettingsRepository for MemorySettings {
    async fn get_setting(&self, key: &str) -> RepositoryResult<Option<Value>> {
        Ok(self
            .values
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()))
    }

    async fn put_setting(&self, key: &str, value: &Value) -> RepositoryResult<()> {
        let mut values = self.values.lock().unwrap();
        values.retain(|(k, _)| k != key);
        values.push((key.to_string(), value.clone()));
        Ok(())
    }

    async fn find_tabs(&self) -> RepositoryResult<Vec<TabVisibility>> {
        Ok(self.tabs.lock().unwrap().clone())
    }

    async fn save_tab(&self, tab: &TabVisibility) -> RepositoryResult<()> {
        let mut tabs = self.tabs.lock().unwrap();
        tabs.retain(|t| t.tab_key != tab.tab_key);
        tabs.push(tab.clone());
        Ok(())
    }

    async fn find_vacations(&self) -> RepositoryResult<Vec<VacationPeriod>> {
        Ok(self.vacations.lock().unwrap().clone())
    }

    async fn save_vacation(&self, vacation: &VacationPeriod) -> RepositoryResult<()> {
        let mut vacations = self.vacations.lock().unwrap();
        vacations.retain(|v| v.id != vacation.id);
        vacations.push(vacation.clone());
        Ok(())
    }

    async fn delete_vacation(&self, id: Uuid) -> RepositoryResult<()> {
        let mut vacations = self.vacations.lock().unwrap();
        let before = vacations.len();
        vacations.retain(|v| v.id != id);
        if vacations.len() == before {
            return Err(RepositoryError::NotFound(format!("Vacation {}", id)));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPolls {
    answers: Mutex<Vec<RefereeAvailability>>,
}

#[async_trait]
impl PollRepository for MemoryPolls {
    async fn upsert_availability(
        &self,
        answers: &[RefereeAvailability],
    ) -> RepositoryResult<Vec<RefereeAvailability>> {
        let mut stored = self.answers.lock().unwrap();
        let mut written = Vec::with_capacity(answers.len());
        for answer in answers {
            let existing = stored
                .iter_mut()
                .find(|a| a.user_id == answer.user_id && a.match_id == answer.match_id);
            let row = match existing {
                Some(row) => {
                    row.poll_month = answer.poll_month.clone();
                    row.is_available = answer.is_available;
                    row.updated_at = answer.updated_at;
                    row.clone()
                }
                None => {
                    stored.push(answer.clone());
                    answer.clone()
                }
            };
            written.push(row);
        }
        Ok(written)
    }

    async fn find_availability_by_month(
        &self,
        poll_month: &str,
    ) -> RepositoryResult<Vec<RefereeAvailability>> {
        Ok(self
            .answers
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.poll_month == poll_month)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<Vec<User>>,
    tokens: Mutex<Vec<PasswordResetToken>>,
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn create(&self, user: User) -> RepositoryResult<Uuid> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(
                "duplicate key value violates unique constraint \"users_email_key\"".to_string(),
            ));
        }
        let id = user.id;
        users.push(user);
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| &u.email == email).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> RepositoryResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("User {}", user_id)))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn update_last_login(&self, _user_id: Uuid) -> RepositoryResult<()> {
        Ok(())
    }

    async fn store_reset_token(&self, token: &PasswordResetToken) -> RepositoryResult<()> {
        self.tokens.lock().unwrap().push(token.clone());
        Ok(())
    }

    async fn find_reset_token(
        &self,
        token_hash: &str,
    ) -> RepositoryResult<Option<PasswordResetToken>> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn consume_reset_token(&self, token_hash: &str) -> RepositoryResult<bool> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens
            .iter_mut()
            .find(|t| t.token_hash == token_hash && t.used_at.is_none())
        {
            Some(token) => {
                token.used_at = Some(chrono::Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Keeps every message instead of sending it
///
/// `delay` stands in for a slow mail API.
#[derive(Default)]
pub struct RecordingEmailSender {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub delay: Duration,
}

impl RecordingEmailSender {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// A router over in-memory repositories, with handles to inspect them
pub struct TestApp {
    pub router: Router,
    pub teams: Arc<MemoryTeams>,
    pub players: Arc<MemoryPlayers>,
    pub matches: Arc<MemoryMatches>,
    pub finance: Arc<MemoryFinance>,
    pub settings: Arc<MemorySettings>,
    pub users: Arc<MemoryUsers>,
    pub email: Arc<RecordingEmailSender>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_email(RecordingEmailSender::default())
    }

    pub fn with_email(email: RecordingEmailSender) -> Self {
        let teams = Arc::new(MemoryTeams::default());
        let players = Arc::new(MemoryPlayers::default());
        let matches = Arc::new(MemoryMatches::default());
        let finance = Arc::new(MemoryFinance::new(matches.clone()));
        let settings = Arc::new(MemorySettings::default());
        let users = Arc::new(MemoryUsers::default());
        let email = Arc::new(email);

        let repos = Repositories {
            teams: teams.clone(),
            players: players.clone(),
            matches: matches.clone(),
            finance: finance.clone(),
            settings: settings.clone(),
            polls: Arc::new(MemoryPolls::default()),
            users: users.clone(),
        };
        let config = AppConfig {
            jwt_secret: TEST_SECRET.to_string(),
            app_url: TEST_APP_URL.to_string(),
            suspension_cache_ttl: Duration::from_secs(300),
            ..AppConfig::default()
        };
        let state = AppState::new(repos, email.clone(), &config);

        Self {
            router: build_router(state),
            teams,
            players,
            matches,
            finance,
            settings,
            users,
            email,
        }
    }

    /// Stores a user with the given password and returns its id
    pub async fn add_user(&self, email: &str, password: &str, role: Role, team_id: Option<Uuid>) -> Uuid {
        let user = User::new(
            Email::new(email).unwrap(),
            hash_password(password).unwrap(),
            "Test Gebruiker",
            role,
            team_id,
        )
        .unwrap();
        self.users.create(user).await.unwrap()
    }

    /// Waits for background email deliveries, up to two seconds
    pub async fn wait_for_emails(&self, count: usize) -> Vec<EmailMessage> {
        for _ in 0..200 {
            {
                let sent = self.email.sent.lock().unwrap();
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.email.sent.lock().unwrap().clone()
    }

    pub async fn request(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).to_string()))
        };
        (status, json)
    }
}

pub fn token_for(role: Role, team_id: Option<Uuid>) -> String {
    create_token(Uuid::new_v4(), role, team_id, TEST_SECRET).unwrap()
}

pub fn admin_token() -> String {
    token_for(Role::Admin, None)
}

pub fn referee_token() -> String {
    token_for(Role::Referee, None)
}
