use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::schedule::VacationPeriod;
use crate::domain::settings::TabVisibility;

/// Admin-editable application settings, tab visibility and vacations
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get_setting(&self, key: &str) -> RepositoryResult<Option<serde_json::Value>>;

    async fn put_setting(&self, key: &str, value: &serde_json::Value) -> RepositoryResult<()>;

    async fn find_tabs(&self) -> RepositoryResult<Vec<TabVisibility>>;

    async fn save_tab(&self, tab: &TabVisibility) -> RepositoryResult<()>;

    /// Vacation periods ordered by start date
    async fn find_vacations(&self) -> RepositoryResult<Vec<VacationPeriod>>;

    async fn save_vacation(&self, vacation: &VacationPeriod) -> RepositoryResult<()>;

    async fn delete_vacation(&self, id: Uuid) -> RepositoryResult<()>;
}
