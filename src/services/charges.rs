//! Card-penalty and match-cost synchronization.
//!
//! Asks the finance repository to reconcile the booked rows of a match
//! against the charges the match implies, and reports what changed.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::finance::ChargeScope;
use crate::domain::matches::CardType;
use crate::domain::repositories::{FinanceRepository, MatchRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Match {0} not found")]
    MatchNotFound(Uuid),
    #[error("Charge sync failed: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub match_id: Uuid,
    pub scope: ChargeScope,
    pub inserted: usize,
    pub deleted: usize,
    /// Card types handed out in the match without a penalty setting
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmapped_cards: Vec<CardType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncFailure {
    pub match_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkSyncReport {
    pub matches_synced: usize,
    pub inserted: usize,
    pub deleted: usize,
    pub failures: Vec<SyncFailure>,
}

pub struct ChargeSync {
    matches: Arc<dyn MatchRepository>,
    finance: Arc<dyn FinanceRepository>,
}

impl ChargeSync {
    pub fn new(matches: Arc<dyn MatchRepository>, finance: Arc<dyn FinanceRepository>) -> Self {
        Self { matches, finance }
    }

    /// Reconciles one family of charges for one match
    ///
    /// # Arguments
    /// * `match_id` - Match whose charges are brought up to date
    /// * `scope` - Card penalties or match costs
    ///
    /// # Returns
    /// * `Ok(SyncReport)` - Rows inserted and deleted, plus unmapped card types
    /// * `Err(SyncError::MatchNotFound)` - If the match does not exist
    ///
    /// The match and the cost settings are read under the match lock, so
    /// the result reflects the form as stored when the sync ran.
    pub async fn sync_match(&self, match_id: Uuid, scope: ChargeScope) -> Result<SyncReport, SyncError> {
        let reconciliation = self
            .finance
            .reconcile_match_charges(match_id, scope)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(_) => SyncError::MatchNotFound(match_id),
                other => SyncError::Repository(other),
            })?;
        let outcome = reconciliation.outcome;

        if !reconciliation.unmapped_cards.is_empty() {
            tracing::warn!(
                %match_id,
                cards = ?reconciliation.unmapped_cards,
                "No penalty cost setting for card types, skipping them"
            );
        }
        if outcome.inserted > 0 || outcome.deleted > 0 {
            tracing::info!(
                %match_id,
                ?scope,
                inserted = outcome.inserted,
                deleted = outcome.deleted,
                "Match charges synchronized"
            );
        }

        Ok(SyncReport {
            match_id,
            scope,
            inserted: outcome.inserted,
            deleted: outcome.deleted,
            unmapped_cards: reconciliation.unmapped_cards,
        })
    }

    /// Penalties then match costs, as run after a match form is submitted
    ///
    /// Stops at the first failure.
    pub async fn sync_after_submit(&self, match_id: Uuid) -> Result<Vec<SyncReport>, SyncError> {
        let penalties = self.sync_match(match_id, ChargeScope::CardPenalties).await?;
        let costs = self.sync_match(match_id, ChargeScope::MatchCosts).await?;
        Ok(vec![penalties, costs])
    }

    /// Reconciles match costs for every match
    ///
    /// A failing match is recorded and the rest still run.
    pub async fn sync_all_match_costs(&self) -> Result<BulkSyncReport, SyncError> {
        let matches = self.matches.find_all().await?;
        let mut report = BulkSyncReport::default();

        for m in &matches {
            match self.sync_match(m.id(), ChargeScope::MatchCosts).await {
                Ok(sync) => {
                    report.matches_synced += 1;
                    report.inserted += sync.inserted;
                    report.deleted += sync.deleted;
                }
                Err(e) => {
                    tracing::error!(match_id = %m.id(), "Match cost sync failed: {}", e);
                    report.failures.push(SyncFailure {
                        match_id: m.id(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            matches = report.matches_synced,
            inserted = report.inserted,
            deleted = report.deleted,
            failures = report.failures.len(),
            "Bulk match cost sync finished"
        );
        Ok(report)
    }
}
