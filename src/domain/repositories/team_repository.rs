use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::team::Team;

/// Repository trait for teams
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Save a team (insert or update)
    async fn save(&self, team: &Team) -> RepositoryResult<()>;

    /// Like `find_all`, falls back to an empty contact when the columns are missing
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Team>>;

    /// All teams ordered by name
    ///
    /// Databases without the contact columns still return teams, with an
    /// empty contact.
    async fn find_all(&self) -> RepositoryResult<Vec<Team>>;

    /// Delete a team by ID, `NotFound` if it does not exist
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
