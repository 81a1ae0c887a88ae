use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryResult;
use crate::domain::finance::{ChargeScope, CostSetting, MatchReconciliation, Transaction};

/// Cost settings and team transactions
#[async_trait]
pub trait FinanceRepository: Send + Sync {
    async fn save_cost_setting(&self, setting: &CostSetting) -> RepositoryResult<()>;

    async fn find_cost_settings(&self) -> RepositoryResult<Vec<CostSetting>>;

    async fn find_cost_setting(&self, id: Uuid) -> RepositoryResult<Option<CostSetting>>;

    async fn delete_cost_setting(&self, id: Uuid) -> RepositoryResult<()>;

    async fn create_transaction(&self, transaction: &Transaction) -> RepositoryResult<()>;

    /// Transactions of a team, newest first
    async fn find_transactions_by_team(&self, team_id: Uuid) -> RepositoryResult<Vec<Transaction>>;

    async fn delete_transaction(&self, id: Uuid) -> RepositoryResult<()>;

    /// Brings the match's charges of one scope in line with the match as stored
    ///
    /// Implementations lock the match, then read it together with the cost
    /// settings and the booked charges, apply
    /// [`ReconciliationPlan::for_match`](crate::domain::finance::ReconciliationPlan::for_match)
    /// and commit as one unit. A form written while a sync waits for the
    /// lock is therefore seen by that sync. `NotFound` if the match is gone.
    async fn reconcile_match_charges(
        &self,
        match_id: Uuid,
        scope: ChargeScope,
    ) -> RepositoryResult<MatchReconciliation>;
}
