use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::postgres_match_repository::{MatchRow, MATCH_COLUMNS};
use crate::domain::finance::{
    ChargeKey, ChargeScope, CostCategory, CostSetting, ExistingCharge, MatchReconciliation,
    ReconciliationPlan, Transaction, TransactionType,
};
use crate::domain::matches::CardType;
use crate::domain::repositories::{FinanceRepository, RepositoryError, RepositoryResult};

/// PostgreSQL implementation of FinanceRepository
///
/// Backed by the `costs` and `team_transactions` tables.
pub struct PostgresFinanceRepository {
    pool: PgPool,
}

impl PostgresFinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CostRow {
    id: Uuid,
    name: String,
    amount: Decimal,
    category: CostCategory,
    card_type: Option<CardType>,
}

impl CostRow {
    fn into_setting(self) -> CostSetting {
        CostSetting {
            id: self.id,
            name: self.name,
            amount: self.amount,
            category: self.category,
            card_type: self.card_type,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    team_id: Uuid,
    amount: Decimal,
    transaction_type: TransactionType,
    description: Option<String>,
    cost_setting_id: Option<Uuid>,
    match_id: Option<Uuid>,
    transaction_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_transaction(self) -> Transaction {
        Transaction {
            id: self.id,
            team_id: self.team_id,
            amount: self.amount,
            transaction_type: self.transaction_type,
            description: self.description,
            cost_setting_id: self.cost_setting_id,
            match_id: self.match_id,
            transaction_date: self.transaction_date,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ChargeRow {
    id: Uuid,
    team_id: Uuid,
    cost_setting_id: Uuid,
    created_at: DateTime<Utc>,
}

const INSERT_TRANSACTION: &str = r#"
    INSERT INTO team_transactions (
        id, team_id, amount, transaction_type, description,
        cost_setting_id, match_id, transaction_date, created_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
"#;

#[async_trait]
impl FinanceRepository for PostgresFinanceRepository {
    async fn save_cost_setting(&self, setting: &CostSetting) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO costs (id, name, amount, category, card_type)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                amount = EXCLUDED.amount,
                category = EXCLUDED.category,
                card_type = EXCLUDED.card_type
            "#,
        )
        .bind(setting.id)
        .bind(&setting.name)
        .bind(setting.amount)
        .bind(setting.category)
        .bind(setting.card_type)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_cost_settings(&self) -> RepositoryResult<Vec<CostSetting>> {
        let rows = sqlx::query_as::<_, CostRow>(
            "SELECT id, name, amount, category, card_type FROM costs ORDER BY category, name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CostRow::into_setting).collect())
    }

    async fn find_cost_setting(&self, id: Uuid) -> RepositoryResult<Option<CostSetting>> {
        let row = sqlx::query_as::<_, CostRow>(
            "SELECT id, name, amount, category, card_type FROM costs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CostRow::into_setting))
    }

    async fn delete_cost_setting(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM costs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Cost setting {}", id)));
        }

        Ok(())
    }

    async fn create_transaction(&self, transaction: &Transaction) -> RepositoryResult<()> {
        sqlx::query(INSERT_TRANSACTION)
            .bind(transaction.id)
            .bind(transaction.team_id)
            .bind(transaction.amount)
            .bind(transaction.transaction_type)
            .bind(transaction.description.as_deref())
            .bind(transaction.cost_setting_id)
            .bind(transaction.match_id)
            .bind(transaction.transaction_date)
            .bind(transaction.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_transactions_by_team(&self, team_id: Uuid) -> RepositoryResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, team_id, amount, transaction_type, description,
                   cost_setting_id, match_id, transaction_date, created_at
            FROM team_transactions
            WHERE team_id = $1
            ORDER BY transaction_date DESC, created_at DESC
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TransactionRow::into_transaction).collect())
    }

    async fn delete_transaction(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM team_transactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Transaction {}", id)));
        }

        Ok(())
    }

    async fn reconcile_match_charges(
        &self,
        match_id: Uuid,
        scope: ChargeScope,
    ) -> RepositoryResult<MatchReconciliation> {
        let mut tx = self.pool.begin().await?;

        // Held until commit: serializes syncs of the match and makes form
        // writes wait, so the row read here is the one being reconciled
        let m = sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {} FROM matches WHERE id = $1 FOR UPDATE",
            MATCH_COLUMNS
        ))
        .bind(match_id)
        .fetch_optional(&mut *tx)
        .await?
        .map(MatchRow::into_match)
        .ok_or_else(|| RepositoryError::NotFound(format!("Match {}", match_id)))?;

        let settings: Vec<CostSetting> = sqlx::query_as::<_, CostRow>(
            "SELECT id, name, amount, category, card_type FROM costs ORDER BY category, name",
        )
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(CostRow::into_setting)
        .collect();

        let existing: Vec<ExistingCharge> = sqlx::query_as::<_, ChargeRow>(
            r#"
            SELECT id, team_id, cost_setting_id, created_at
            FROM team_transactions
            WHERE match_id = $1
              AND transaction_type = $2
              AND cost_setting_id IS NOT NULL
            "#,
        )
        .bind(match_id)
        .bind(scope.transaction_type())
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|r| ExistingCharge {
            id: r.id,
            key: ChargeKey {
                team_id: r.team_id,
                cost_setting_id: r.cost_setting_id,
            },
            created_at: r.created_at,
        })
        .collect();

        let (plan, unmapped_cards) = ReconciliationPlan::for_match(scope, &m, &settings, &existing);

        for row in &plan.inserts {
            sqlx::query(INSERT_TRANSACTION)
                .bind(row.id)
                .bind(row.team_id)
                .bind(row.amount)
                .bind(row.transaction_type)
                .bind(row.description.as_deref())
                .bind(row.cost_setting_id)
                .bind(row.match_id)
                .bind(row.transaction_date)
                .bind(row.created_at)
                .execute(&mut *tx)
                .await?;
        }

        if !plan.deletes.is_empty() {
            sqlx::query("DELETE FROM team_transactions WHERE id = ANY($1)")
                .bind(&plan.deletes)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let outcome = plan.outcome();
        tracing::debug!(
            %match_id,
            ?scope,
            inserted = outcome.inserted,
            deleted = outcome.deleted,
            "Reconciled match charges"
        );
        Ok(MatchReconciliation {
            outcome,
            unmapped_cards,
        })
    }
}
