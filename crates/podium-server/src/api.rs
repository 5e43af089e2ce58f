use axum::Extension;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use podium_core::caller::{Caller, Identity};
use podium_core::record::{LeaderboardEntry, PlayerStanding, Score, SubmitResult};

use crate::config::LeaderboardConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Query string for the top-N view.
#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub n: Option<i64>,
}

/// Resolve the requested entry count: default when omitted, 400 when not
/// positive, clamped to the configured maximum.
fn resolve_top_n(n: Option<i64>, config: &LeaderboardConfig) -> Result<usize, AppError> {
    match n {
        None => Ok(config.default_top_n),
        Some(n) if n <= 0 => Err(AppError::BadRequest(format!(
            "n must be a positive integer, got {n}"
        ))),
        Some(n) => {
            let n = usize::try_from(n).unwrap_or(usize::MAX);
            Ok(n.min(config.max_top_n))
        },
    }
}

/// GET /leaderboard/top?n= returns a ranked top-N snapshot. Open to everyone.
pub async fn get_top(
    State(state): State<AppState>,
    query: Result<Query<TopQuery>, QueryRejection>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let Query(query) = query?;
    let n = resolve_top_n(query.n, &state.config.leaderboard)?;
    let entries = state.store.top_n(n)?;
    Ok(Json(entries))
}

/// Request body for a score submission.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreBody {
    pub player_id: String,
    pub display_name: String,
    pub score: Score,
}

/// POST /leaderboard/scores submits a score for the authenticated caller.
pub async fn post_score(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    body: Result<Json<SubmitScoreBody>, JsonRejection>,
) -> Result<Json<SubmitResult>, AppError> {
    let Some(identity) = caller.identity() else {
        return Err(AppError::Unauthorized("login required".to_string()));
    };

    let Json(body) = body?;

    if body.player_id != identity.player_id {
        tracing::warn!(
            caller = %identity.player_id,
            player_id = %body.player_id,
            "Score submitted for another player"
        );
        return Err(AppError::Unauthorized(
            "playerId does not match the logged-in player".to_string(),
        ));
    }

    let result = state
        .store
        .submit(&body.player_id, body.score, &body.display_name)?;

    if result.accepted {
        tracing::info!(
            player_id = %body.player_id,
            score = result.best_score,
            "New best score"
        );
    } else {
        tracing::debug!(
            player_id = %body.player_id,
            submitted = body.score,
            best = result.best_score,
            "Score did not beat personal best"
        );
    }

    Ok(Json(result))
}

/// GET /leaderboard/players/{player_id} returns one player's best score and rank.
pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerStanding>, AppError> {
    match state.store.standing(&player_id)? {
        Some(standing) => Ok(Json(standing)),
        None => Err(AppError::NotFound(format!("No score for player {player_id}"))),
    }
}

/// Response for the current-session endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub logged_in: bool,
    pub user: Option<Identity>,
}

/// GET /auth/me reports who the session token belongs to, if anyone.
pub async fn get_me(Extension(caller): Extension<Caller>) -> Json<MeResponse> {
    Json(MeResponse {
        logged_in: caller.is_authenticated(),
        user: caller.identity().cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use podium_core::test_helpers::make_identity;

    fn alice() -> Caller {
        Caller::Authenticated(make_identity("p1", "Alice"))
    }

    fn body(
        player_id: &str,
        name: &str,
        score: Score,
    ) -> Result<Json<SubmitScoreBody>, JsonRejection> {
        Ok(Json(SubmitScoreBody {
            player_id: player_id.to_string(),
            display_name: name.to_string(),
            score,
        }))
    }

    #[test]
    fn top_n_resolution() {
        let cfg = LeaderboardConfig::default();
        assert_eq!(resolve_top_n(None, &cfg).unwrap(), 10);
        assert_eq!(resolve_top_n(Some(3), &cfg).unwrap(), 3);
        assert_eq!(resolve_top_n(Some(1_000_000), &cfg).unwrap(), 100);
        assert!(matches!(
            resolve_top_n(Some(0), &cfg),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            resolve_top_n(Some(-4), &cfg),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn anonymous_submission_unauthorized() {
        let state = AppState::new(ServerConfig::default());
        let result = post_score(
            State(state.clone()),
            Extension(Caller::Anonymous),
            body("p1", "Alice", 100),
        )
        .await;
        assert!(matches!(result.unwrap_err(), AppError::Unauthorized(_)));
        assert_eq!(state.store.player_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn submission_for_other_player_unauthorized() {
        let state = AppState::new(ServerConfig::default());
        let result = post_score(
            State(state.clone()),
            Extension(alice()),
            body("p2", "Bob", 100),
        )
        .await;
        assert!(matches!(result.unwrap_err(), AppError::Unauthorized(_)));
        assert_eq!(state.store.player_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn authenticated_submission_applies_policy() {
        let state = AppState::new(ServerConfig::default());

        let Json(first) = post_score(
            State(state.clone()),
            Extension(alice()),
            body("p1", "Alice", 100),
        )
        .await
        .unwrap();
        assert!(first.accepted);
        assert_eq!(first.best_score, 100);

        let Json(lower) = post_score(
            State(state.clone()),
            Extension(alice()),
            body("p1", "Alicia", 90),
        )
        .await
        .unwrap();
        assert!(!lower.accepted);
        assert_eq!(lower.best_score, 100);

        let Json(top) = get_top(State(state), Ok(Query(TopQuery { n: None })))
            .await
            .unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].display_name, "Alice");
    }

    #[tokio::test]
    async fn long_run_of_improvements_all_accepted() {
        let state = AppState::new(ServerConfig::default());
        for score in (1..=25).map(|i| i * 10) {
            let Json(result) = post_score(
                State(state.clone()),
                Extension(alice()),
                body("p1", "Alice", score),
            )
            .await
            .unwrap();
            assert!(result.accepted, "score {score}");
        }
        let standing = state.store.standing("p1").unwrap().unwrap();
        assert_eq!(standing.best_score, 250);
    }

    #[tokio::test]
    async fn negative_score_is_bad_request() {
        let state = AppState::new(ServerConfig::default());
        let result = post_score(
            State(state.clone()),
            Extension(alice()),
            body("p1", "Alice", -10),
        )
        .await;
        assert!(matches!(result.unwrap_err(), AppError::BadRequest(_)));
        assert_eq!(state.store.player_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn player_lookup() {
        let state = AppState::new(ServerConfig::default());
        state.store.submit("p1", 10, "Alice").unwrap();
        state.store.submit("p2", 20, "Bob").unwrap();

        let Json(standing) = get_player(State(state.clone()), Path("p1".to_string()))
            .await
            .unwrap();
        assert_eq!(standing.rank, 2);

        let missing = get_player(State(state), Path("ghost".to_string())).await;
        assert!(matches!(missing.unwrap_err(), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn me_reports_session() {
        let Json(me) = get_me(Extension(alice())).await;
        assert!(me.logged_in);
        assert_eq!(me.user.unwrap().display_name, "Alice");

        let Json(me) = get_me(Extension(Caller::Anonymous)).await;
        assert!(!me.logged_in);
        assert!(me.user.is_none());
    }
}
