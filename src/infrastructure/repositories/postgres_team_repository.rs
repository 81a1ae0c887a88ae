use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::repositories::{RepositoryError, RepositoryResult, TeamRepository};
use crate::domain::team::{Team, TeamContact};
use crate::domain::user::Email;

/// SQLSTATE raised when a selected column does not exist
const UNDEFINED_COLUMN: &str = "42703";

/// PostgreSQL implementation of TeamRepository
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Creates a new PostgresTeamRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_id_basic(&self, id: Uuid) -> RepositoryResult<Option<Team>> {
        let row = sqlx::query_as::<_, BasicTeamRow>(
            "SELECT id, name, created_at FROM teams WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BasicTeamRow::into_team))
    }

    async fn find_all_basic(&self) -> RepositoryResult<Vec<Team>> {
        let rows = sqlx::query_as::<_, BasicTeamRow>(
            r#"
            SELECT id, name, created_at
            FROM teams
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BasicTeamRow::into_team).collect())
    }
}

#[derive(sqlx::FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    contact_person: Option<String>,
    contact_phone: Option<String>,
    contact_email: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct BasicTeamRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl BasicTeamRow {
    fn into_team(self) -> Team {
        Team::from_persistence(self.id, self.name, TeamContact::default(), self.created_at)
    }
}

impl TeamRow {
    fn into_team(self) -> RepositoryResult<Team> {
        let contact_email = self
            .contact_email
            .map(Email::new)
            .transpose()
            .map_err(RepositoryError::Corrupt)?;

        Ok(Team::from_persistence(
            self.id,
            self.name,
            TeamContact {
                contact_person: self.contact_person,
                contact_phone: self.contact_phone,
                contact_email,
            },
            self.created_at,
        ))
    }
}

fn is_undefined_column(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNDEFINED_COLUMN))
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn save(&self, team: &Team) -> RepositoryResult<()> {
        let contact = team.contact();
        sqlx::query(
            r#"
            INSERT INTO teams (
                id, name, contact_person, contact_phone, contact_email, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                contact_person = EXCLUDED.contact_person,
                contact_phone = EXCLUDED.contact_phone,
                contact_email = EXCLUDED.contact_email
            "#,
        )
        .bind(team.id())
        .bind(team.name())
        .bind(contact.contact_person.as_deref())
        .bind(contact.contact_phone.as_deref())
        .bind(contact.contact_email.as_ref().map(Email::as_str))
        .bind(team.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Team>> {
        let result = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT id, name, contact_person, contact_phone, contact_email, created_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(row) => row.map(TeamRow::into_team).transpose(),
            Err(e) if is_undefined_column(&e) => {
                tracing::warn!("Team contact columns missing, falling back to basic columns: {}", e);
                self.find_by_id_basic(id).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Team>> {
        let result = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT id, name, contact_person, contact_phone, contact_email, created_at
            FROM teams
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(rows) => rows.into_iter().map(TeamRow::into_team).collect(),
            Err(e) if is_undefined_column(&e) => {
                tracing::warn!("Team contact columns missing, falling back to basic columns: {}", e);
                self.find_all_basic().await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Team {}", id)));
        }

        Ok(())
    }
}
