use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::domain::matches::{LineupEntry, Match, Side};
use crate::domain::repositories::{MatchRepository, RepositoryError, RepositoryResult};

pub(super) const MATCH_COLUMNS: &str = r#"
    id, matchday, match_date, location, home_team_id, away_team_id,
    home_score, away_score, home_players, away_players,
    referee, referee_notes, is_submitted, is_locked
"#;

/// PostgreSQL implementation of MatchRepository
///
/// Lineups live in JSONB columns next to the match row.
pub struct PostgresMatchRepository {
    pool: PgPool,
}

impl PostgresMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct MatchRow {
    id: Uuid,
    matchday: Option<i32>,
    match_date: NaiveDateTime,
    location: String,
    home_team_id: Uuid,
    away_team_id: Uuid,
    home_score: Option<i32>,
    away_score: Option<i32>,
    home_players: Json<Vec<LineupEntry>>,
    away_players: Json<Vec<LineupEntry>>,
    referee: Option<String>,
    referee_notes: Option<String>,
    is_submitted: bool,
    is_locked: bool,
}

impl MatchRow {
    pub(super) fn into_match(self) -> Match {
        Match::from_persistence(
            self.id,
            self.matchday,
            self.match_date,
            self.location,
            self.home_team_id,
            self.away_team_id,
            self.home_score,
            self.away_score,
            self.home_players.0,
            self.away_players.0,
            self.referee,
            self.referee_notes,
            self.is_submitted,
            self.is_locked,
        )
    }
}

fn upsert(m: &Match) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(
        r#"
        INSERT INTO matches (
            id, matchday, match_date, location, home_team_id, away_team_id,
            home_score, away_score, home_players, away_players,
            referee, referee_notes, is_submitted, is_locked
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        ON CONFLICT (id) DO UPDATE SET
            matchday = EXCLUDED.matchday,
            match_date = EXCLUDED.match_date,
            location = EXCLUDED.location,
            home_score = EXCLUDED.home_score,
            away_score = EXCLUDED.away_score,
            home_players = EXCLUDED.home_players,
            away_players = EXCLUDED.away_players,
            referee = EXCLUDED.referee,
            referee_notes = EXCLUDED.referee_notes,
            is_submitted = EXCLUDED.is_submitted,
            is_locked = EXCLUDED.is_locked
        "#,
    )
    .bind(m.id())
    .bind(m.matchday())
    .bind(m.match_date())
    .bind(m.location())
    .bind(m.home_team_id())
    .bind(m.away_team_id())
    .bind(m.home_score())
    .bind(m.away_score())
    .bind(Json(m.lineup(Side::Home)))
    .bind(Json(m.lineup(Side::Away)))
    .bind(m.referee())
    .bind(m.referee_notes())
    .bind(m.is_submitted())
    .bind(m.is_locked())
}

#[async_trait]
impl MatchRepository for PostgresMatchRepository {
    async fn save(&self, m: &Match) -> RepositoryResult<()> {
        upsert(m).execute(&self.pool).await?;
        Ok(())
    }

    async fn save_all(&self, matches: &[Match]) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;
        for m in matches {
            upsert(m).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::debug!(count = matches.len(), "Stored generated matches");
        Ok(())
    }

    async fn save_form(&self, m: &Match) -> RepositoryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE matches SET
                home_score = $2,
                away_score = $3,
                home_players = $4,
                away_players = $5,
                referee = $6,
                referee_notes = $7,
                is_submitted = true
            WHERE id = $1 AND NOT is_locked
            "#,
        )
        .bind(m.id())
        .bind(m.home_score())
        .bind(m.away_score())
        .bind(Json(m.lineup(Side::Home)))
        .bind(Json(m.lineup(Side::Away)))
        .bind(m.referee())
        .bind(m.referee_notes())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_locked(&self, id: Uuid, locked: bool) -> RepositoryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE matches SET is_locked = $2
            WHERE id = $1
              AND is_locked <> $2
              AND (is_submitted OR NOT $2)
            "#,
        )
        .bind(id)
        .bind(locked)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn save_schedule(&self, m: &Match) -> RepositoryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE matches SET
                match_date = $2,
                location = $3,
                referee = $4
            WHERE id = $1
              AND NOT is_locked
              AND (NOT is_submitted OR (match_date = $2 AND location = $3))
            "#,
        )
        .bind(m.id())
        .bind(m.match_date())
        .bind(m.location())
        .bind(m.referee())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Match>> {
        let row = sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {} FROM matches WHERE id = $1",
            MATCH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MatchRow::into_match))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Match>> {
        let rows = sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {} FROM matches ORDER BY match_date, location",
            MATCH_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MatchRow::into_match).collect())
    }

    async fn find_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<Match>> {
        let rows = sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {} FROM matches WHERE match_date >= $1 AND match_date < $2 ORDER BY match_date, location",
            MATCH_COLUMNS
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MatchRow::into_match).collect())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Match {}", id)));
        }

        Ok(())
    }
}
