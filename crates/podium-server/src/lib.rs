pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod health;
pub mod state;
pub mod store;

use std::time::Duration;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use config::ServerConfig;
use state::{AppState, SharedStore};

/// Build the Axum router and application state from a config, backed by the
/// in-memory sharded store.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let state = AppState::new(config);
    (router(state.clone()), state)
}

/// Build the router around a caller-provided store.
pub fn build_app_with_store(
    config: ServerConfig,
    store: SharedStore,
) -> (Router<()>, AppState) {
    let state = AppState::with_store(config, store);
    (router(state.clone()), state)
}

fn router(state: AppState) -> Router<()> {
    let timeout = Duration::from_secs(state.config.limits.request_timeout_secs);

    let leaderboard_routes = Router::new()
        .route("/top", get(api::get_top))
        .route("/scores", post(api::post_score))
        .route("/players/{player_id}", get(api::get_player));

    Router::new()
        .nest("/leaderboard", leaderboard_routes)
        .route("/auth/me", get(api::get_me))
        .route("/health", get(health::health_check))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_middleware,
        ))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
