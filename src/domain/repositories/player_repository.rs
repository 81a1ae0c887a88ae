use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::player::Player;

#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn save(&self, player: &Player) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Player>>;

    /// Players of a team ordered by last name, first name
    async fn find_by_team(&self, team_id: Uuid) -> RepositoryResult<Vec<Player>>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
