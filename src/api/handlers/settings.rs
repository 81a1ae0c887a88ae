use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::middleware::auth::{AuthUser, MaybeViewer};
use crate::api::state::AppState;
use crate::domain::settings::TabVisibility;
use crate::domain::suspension::SuspensionRules;

#[derive(Debug, Deserialize)]
pub struct TabVisibilityRequest {
    #[serde(default)]
    pub visible_to_public: bool,
    #[serde(default)]
    pub visible_to_player_manager: bool,
    #[serde(default)]
    pub visible_to_referee: bool,
}

/// Rules in force, defaults when none are stored
///
/// GET /api/settings/suspension-rules
pub async fn get_suspension_rules(State(state): State<AppState>) -> Json<SuspensionRules> {
    Json(state.suspension_rules.current().await)
}

/// PUT /api/settings/suspension-rules
pub async fn update_suspension_rules(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(rules): Json<SuspensionRules>,
) -> Result<Json<SuspensionRules>, ApiError> {
    auth.require_admin()?;
    let rules = state.suspension_rules.update(rules).await?;
    Ok(Json(rules))
}

/// Tabs the caller may see; admins get every tab with its flags
///
/// GET /api/tabs
pub async fn list_tabs(
    State(state): State<AppState>,
    MaybeViewer(viewer): MaybeViewer,
) -> Result<Json<Vec<TabVisibility>>, ApiError> {
    let tabs = state.repos.settings.find_tabs().await?;
    Ok(Json(
        tabs.into_iter()
            .filter(|tab| tab.is_visible_to(&viewer))
            .collect(),
    ))
}

/// PUT /api/tabs/:key
pub async fn update_tab(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(key): Path<String>,
    Json(req): Json<TabVisibilityRequest>,
) -> Result<Json<TabVisibility>, ApiError> {
    auth.require_admin()?;

    let mut tab = TabVisibility::new(key).map_err(ApiError::bad_request)?;
    tab.visible_to_public = req.visible_to_public;
    tab.visible_to_player_manager = req.visible_to_player_manager;
    tab.visible_to_referee = req.visible_to_referee;
    state.repos.settings.save_tab(&tab).await?;

    tracing::info!(tab = %tab.tab_key, "Tab visibility updated");
    Ok(Json(tab))
}
