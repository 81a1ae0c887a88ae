//! Cached suspension rules.
//!
//! Rules live in the application settings table. Readers hit an in-process
//! copy that expires after the configured TTL; an admin update writes the
//! row and drops the copy.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::repositories::{RepositoryError, SettingsRepository};
use crate::domain::settings::SUSPENSION_RULES_KEY;
use crate::domain::suspension::SuspensionRules;

#[derive(Debug, Error)]
pub enum RuleUpdateError {
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

struct CachedRules {
    rules: SuspensionRules,
    loaded_at: Instant,
}

/// Cached copy plus a counter bumped on every invalidation. A load only
/// publishes its result when the counter has not moved since it started.
#[derive(Default)]
struct CacheState {
    entry: Option<CachedRules>,
    generation: u64,
}

pub struct SuspensionRuleCache {
    settings: Arc<dyn SettingsRepository>,
    ttl: Duration,
    cached: RwLock<CacheState>,
}

impl SuspensionRuleCache {
    pub fn new(settings: Arc<dyn SettingsRepository>, ttl: Duration) -> Self {
        Self {
            settings,
            ttl,
            cached: RwLock::new(CacheState::default()),
        }
    }

    /// Current rules, never failing
    ///
    /// A missing row yields the defaults. A read or parse error also yields
    /// the defaults, logged at warn, and is not cached so the next call
    /// tries again. A load that overlaps an update is returned to its
    /// caller but not cached.
    pub async fn current(&self) -> SuspensionRules {
        let generation = {
            let cached = self.cached.read().await;
            if let Some(entry) = cached.entry.as_ref() {
                if entry.loaded_at.elapsed() < self.ttl {
                    return entry.rules.clone();
                }
            }
            cached.generation
        };

        match self.load().await {
            Ok(rules) => {
                let mut cached = self.cached.write().await;
                if cached.generation == generation {
                    cached.entry = Some(CachedRules {
                        rules: rules.clone(),
                        loaded_at: Instant::now(),
                    });
                }
                rules
            }
            Err(message) => {
                tracing::warn!("Falling back to default suspension rules: {}", message);
                SuspensionRules::default()
            }
        }
    }

    async fn load(&self) -> Result<SuspensionRules, String> {
        let value = self
            .settings
            .get_setting(SUSPENSION_RULES_KEY)
            .await
            .map_err(|e| e.to_string())?;

        match value {
            None => Ok(SuspensionRules::default()),
            Some(value) => serde_json::from_value::<SuspensionRules>(value)
                .map_err(|e| format!("Stored suspension rules are malformed: {}", e))?
                .validate(),
        }
    }

    /// Validates, stores and activates new rules
    ///
    /// # Arguments
    /// * `rules` - Replacement rules; sorted by minimum on success
    ///
    /// # Returns
    /// * `Ok(SuspensionRules)` - The rules as stored
    /// * `Err(RuleUpdateError::Invalid)` - If the rules break an invariant; nothing is stored
    /// * `Err(RuleUpdateError::Repository)` - If the settings row cannot be written
    pub async fn update(&self, rules: SuspensionRules) -> Result<SuspensionRules, RuleUpdateError> {
        let rules = rules.validate().map_err(RuleUpdateError::Invalid)?;

        let value = serde_json::to_value(&rules).map_err(RepositoryError::from)?;
        self.settings.put_setting(SUSPENSION_RULES_KEY, &value).await?;
        self.invalidate().await;

        tracing::info!(
            rules = rules.yellow_card_rules.len(),
            red_card_suspension = rules.red_card_suspension,
            "Suspension rules updated"
        );
        Ok(rules)
    }

    pub async fn invalidate(&self) {
        let mut cached = self.cached.write().await;
        cached.entry = None;
        cached.generation += 1;
    }
}
