use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::player::Player;
use crate::domain::repositories::{PlayerRepository, RepositoryError, RepositoryResult};

pub struct PostgresPlayerRepository {
    pool: PgPool,
}

impl PostgresPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PlayerRow {
    id: Uuid,
    team_id: Uuid,
    first_name: String,
    last_name: String,
    birth_date: Option<NaiveDate>,
    is_active: bool,
}

impl PlayerRow {
    fn into_player(self) -> Player {
        Player::from_persistence(
            self.id,
            self.team_id,
            self.first_name,
            self.last_name,
            self.birth_date,
            self.is_active,
        )
    }
}

#[async_trait]
impl PlayerRepository for PostgresPlayerRepository {
    async fn save(&self, player: &Player) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO players (id, team_id, first_name, last_name, birth_date, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                team_id = EXCLUDED.team_id,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                birth_date = EXCLUDED.birth_date,
                is_active = EXCLUDED.is_active
            "#,
        )
        .bind(player.id())
        .bind(player.team_id())
        .bind(player.first_name())
        .bind(player.last_name())
        .bind(player.birth_date())
        .bind(player.is_active())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Player>> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT id, team_id, first_name, last_name, birth_date, is_active
            FROM players
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PlayerRow::into_player))
    }

    async fn find_by_team(&self, team_id: Uuid) -> RepositoryResult<Vec<Player>> {
        let rows = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT id, team_id, first_name, last_name, birth_date, is_active
            FROM players
            WHERE team_id = $1
            ORDER BY last_name, first_name
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PlayerRow::into_player).collect())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Player {}", id)));
        }

        Ok(())
    }
}
