use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{
    auth as auth_handlers, finance, matches, players, polls, schedule, settings, teams, users,
};
use crate::api::state::AppState;

/// All HTTP routes with tracing and CORS layers
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(auth_handlers::health_check))
        // Auth routes
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/auth/me", get(auth_handlers::me))
        .route("/api/auth/password-reset", post(auth_handlers::request_password_reset))
        .route(
            "/api/auth/password-reset/confirm",
            post(auth_handlers::confirm_password_reset),
        )
        .route("/api/users", post(users::create_user).get(users::list_users))
        // Team routes
        .route("/api/teams", get(teams::list_teams).post(teams::create_team))
        .route(
            "/api/teams/:id",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        .route("/api/teams/:id/players", get(teams::list_team_players))
        .route("/api/teams/:id/balance", get(finance::get_team_balance))
        .route("/api/teams/:id/transactions", get(finance::team_transactions))
        // Player routes
        .route("/api/players", post(players::create_player))
        .route(
            "/api/players/:id",
            get(players::get_player)
                .put(players::update_player)
                .delete(players::delete_player),
        )
        .route("/api/players/:id/suspension", get(players::player_suspension))
        // Match routes
        .route("/api/matches", get(matches::list_matches).post(matches::create_match))
        .route("/api/matches/sync/costs", post(matches::sync_all_costs))
        .route(
            "/api/matches/:id",
            get(matches::get_match)
                .put(matches::update_match)
                .delete(matches::delete_match),
        )
        .route("/api/matches/:id/submit", post(matches::submit_match))
        .route("/api/matches/:id/lock", post(matches::lock_match))
        .route("/api/matches/:id/unlock", post(matches::unlock_match))
        .route("/api/matches/:id/sync/penalties", post(matches::sync_penalties))
        .route("/api/matches/:id/sync/costs", post(matches::sync_costs))
        // Competition
        .route("/api/standings", get(schedule::get_standings))
        .route("/api/schedule/generate", post(schedule::generate))
        .route(
            "/api/vacations",
            get(schedule::list_vacations).post(schedule::create_vacation),
        )
        .route("/api/vacations/:id", delete(schedule::delete_vacation))
        // Finance
        .route("/api/costs", get(finance::list_costs).post(finance::create_cost))
        .route(
            "/api/costs/:id",
            put(finance::update_cost).delete(finance::delete_cost),
        )
        .route("/api/transactions", post(finance::create_transaction))
        .route("/api/transactions/:id", delete(finance::delete_transaction))
        // Settings
        .route(
            "/api/settings/suspension-rules",
            get(settings::get_suspension_rules).put(settings::update_suspension_rules),
        )
        .route("/api/tabs", get(settings::list_tabs))
        .route("/api/tabs/:key", put(settings::update_tab))
        // Referee polls
        .route("/api/polls/availability", post(polls::submit_availability))
        .route("/api/polls/:year/:month", get(polls::get_poll))
        .route(
            "/api/polls/:year/:month/availability",
            get(polls::list_availability),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}
