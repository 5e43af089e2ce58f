use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Structured health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Players with a record. `None` when the store cannot be read.
    pub players: Option<usize>,
}

/// Health check endpoint. Reports `degraded` when the store is unavailable.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, players) = match state.store.player_count() {
        Ok(n) => ("healthy", Some(n)),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read store");
            ("degraded", None)
        },
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        players,
    })
}
