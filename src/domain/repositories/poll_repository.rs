use async_trait::async_trait;

use super::errors::RepositoryResult;
use crate::domain::polls::RefereeAvailability;

#[async_trait]
pub trait PollRepository: Send + Sync {
    /// Insert or update by (user_id, match_id)
    ///
    /// Returns the rows as stored: an answer that replaces an earlier one
    /// keeps the earlier id.
    async fn upsert_availability(
        &self,
        answers: &[RefereeAvailability],
    ) -> RepositoryResult<Vec<RefereeAvailability>>;

    async fn find_availability_by_month(
        &self,
        poll_month: &str,
    ) -> RepositoryResult<Vec<RefereeAvailability>>;
}
