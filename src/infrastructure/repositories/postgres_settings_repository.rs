use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::repositories::{RepositoryError, RepositoryResult, SettingsRepository};
use crate::domain::schedule::VacationPeriod;
use crate::domain::settings::TabVisibility;

/// PostgreSQL implementation of SettingsRepository
///
/// Covers `application_settings`, `tab_visibility_settings` and
/// `vacation_periods`.
pub struct PostgresSettingsRepository {
    pool: PgPool,
}

impl PostgresSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TabRow {
    tab_key: String,
    visible_to_public: bool,
    visible_to_player_manager: bool,
    visible_to_referee: bool,
}

#[derive(sqlx::FromRow)]
struct VacationRow {
    id: Uuid,
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_active: bool,
}

#[async_trait]
impl SettingsRepository for PostgresSettingsRepository {
    async fn get_setting(&self, key: &str) -> RepositoryResult<Option<serde_json::Value>> {
        let value: Option<(Json<serde_json::Value>,)> =
            sqlx::query_as("SELECT value FROM application_settings WHERE setting_key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value.map(|(Json(v),)| v))
    }

    async fn put_setting(&self, key: &str, value: &serde_json::Value) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO application_settings (setting_key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (setting_key) DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(Json(value))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_tabs(&self) -> RepositoryResult<Vec<TabVisibility>> {
        let rows = sqlx::query_as::<_, TabRow>(
            r#"
            SELECT tab_key, visible_to_public, visible_to_player_manager, visible_to_referee
            FROM tab_visibility_settings
            ORDER BY tab_key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TabVisibility {
                tab_key: r.tab_key,
                visible_to_public: r.visible_to_public,
                visible_to_player_manager: r.visible_to_player_manager,
                visible_to_referee: r.visible_to_referee,
            })
            .collect())
    }

    async fn save_tab(&self, tab: &TabVisibility) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tab_visibility_settings (
                tab_key, visible_to_public, visible_to_player_manager, visible_to_referee
            )
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (tab_key) DO UPDATE SET
                visible_to_public = EXCLUDED.visible_to_public,
                visible_to_player_manager = EXCLUDED.visible_to_player_manager,
                visible_to_referee = EXCLUDED.visible_to_referee
            "#,
        )
        .bind(&tab.tab_key)
        .bind(tab.visible_to_public)
        .bind(tab.visible_to_player_manager)
        .bind(tab.visible_to_referee)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_vacations(&self) -> RepositoryResult<Vec<VacationPeriod>> {
        let rows = sqlx::query_as::<_, VacationRow>(
            "SELECT id, name, start_date, end_date, is_active FROM vacation_periods ORDER BY start_date",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| VacationPeriod {
                id: r.id,
                name: r.name,
                start_date: r.start_date,
                end_date: r.end_date,
                is_active: r.is_active,
            })
            .collect())
    }

    async fn save_vacation(&self, vacation: &VacationPeriod) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vacation_periods (id, name, start_date, end_date, is_active)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                is_active = EXCLUDED.is_active
            "#,
        )
        .bind(vacation.id)
        .bind(&vacation.name)
        .bind(vacation.start_date)
        .bind(vacation.end_date)
        .bind(vacation.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_vacation(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM vacation_periods WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Vacation period {}", id)));
        }

        Ok(())
    }
}
