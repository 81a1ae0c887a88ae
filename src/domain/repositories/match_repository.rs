use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::matches::Match;

/// Matches and their forms
///
/// `save` writes the whole row and is meant for new matches. Changes to an
/// existing match go through the guarded writes, which re-check the stored
/// state and report `false` when it no longer allows the change.
#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn save(&self, m: &Match) -> RepositoryResult<()>;

    /// Insert many matches at once, all or nothing
    async fn save_all(&self, matches: &[Match]) -> RepositoryResult<()>;

    /// Writes the form columns of a submitted match unless the stored row is locked
    async fn save_form(&self, m: &Match) -> RepositoryResult<bool>;

    /// Sets the lock flag
    ///
    /// Only applies when the stored flag differs, and a lock only applies
    /// to a submitted form.
    async fn set_locked(&self, id: Uuid, locked: bool) -> RepositoryResult<bool>;

    /// Writes date, location and referee
    ///
    /// Refused when the stored row is locked, or is submitted and the date
    /// or location would change.
    async fn save_schedule(&self, m: &Match) -> RepositoryResult<bool>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Match>>;

    /// All matches ordered by date
    async fn find_all(&self) -> RepositoryResult<Vec<Match>>;

    /// Matches with `start <= match_date < end`, ordered by date
    async fn find_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<Match>>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
