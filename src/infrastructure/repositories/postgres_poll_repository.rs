use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::polls::RefereeAvailability;
use crate::domain::repositories::{PollRepository, RepositoryResult};

pub struct PostgresPollRepository {
    pool: PgPool,
}

impl PostgresPollRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AvailabilityRow {
    id: Uuid,
    user_id: Uuid,
    match_id: Uuid,
    poll_month: String,
    is_available: bool,
    updated_at: DateTime<Utc>,
}

impl AvailabilityRow {
    fn into_availability(self) -> RefereeAvailability {
        RefereeAvailability {
            id: self.id,
            user_id: self.user_id,
            match_id: self.match_id,
            poll_month: self.poll_month,
            is_available: self.is_available,
            updated_at: self.updated_at,
        }
    }
}

#[async_trait]
impl PollRepository for PostgresPollRepository {
    async fn upsert_availability(
        &self,
        answers: &[RefereeAvailability],
    ) -> RepositoryResult<Vec<RefereeAvailability>> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(answers.len());
        for answer in answers {
            let row = sqlx::query_as::<_, AvailabilityRow>(
                r#"
                INSERT INTO referee_availability (
                    id, user_id, match_id, poll_month, is_available, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (user_id, match_id) DO UPDATE SET
                    poll_month = EXCLUDED.poll_month,
                    is_available = EXCLUDED.is_available,
                    updated_at = EXCLUDED.updated_at
                RETURNING id, user_id, match_id, poll_month, is_available, updated_at
                "#,
            )
            .bind(answer.id)
            .bind(answer.user_id)
            .bind(answer.match_id)
            .bind(&answer.poll_month)
            .bind(answer.is_available)
            .bind(answer.updated_at)
            .fetch_one(&mut *tx)
            .await?;
            stored.push(row.into_availability());
        }
        tx.commit().await?;

        Ok(stored)
    }

    async fn find_availability_by_month(
        &self,
        poll_month: &str,
    ) -> RepositoryResult<Vec<RefereeAvailability>> {
        let rows = sqlx::query_as::<_, AvailabilityRow>(
            r#"
            SELECT id, user_id, match_id, poll_month, is_available, updated_at
            FROM referee_availability
            WHERE poll_month = $1
            ORDER BY match_id, user_id
            "#,
        )
        .bind(poll_month)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AvailabilityRow::into_availability).collect())
    }
}
