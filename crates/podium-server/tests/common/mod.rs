use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use podium_core::record::{LeaderboardEntry, PlayerStanding, Score, SubmitResult};
use podium_core::test_helpers::make_identity;

use podium_server::auth::SessionSigner;
use podium_server::build_app_with_store;
use podium_server::config::{AuthFileConfig, ServerConfig};
use podium_server::state::SharedStore;
use podium_server::store::{LeaderboardStore, ShardedStore, StoreError};

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: SharedStore,
    pub sessions: SessionSigner,
    _shutdown: tokio::task::JoinHandle<()>,
}

/// Config with a known session secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        auth: AuthFileConfig {
            session_secret: Some(TEST_SECRET.to_string()),
        },
        ..ServerConfig::default()
    }
}

impl TestServer {
    /// Start a test server backed by the in-memory store.
    pub async fn new() -> Self {
        Self::from_config(test_config()).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let store: SharedStore = Arc::new(ShardedStore::with_shards(
            config.leaderboard.shard_count,
            config.leaderboard.submission_limits(),
        ));
        Self::with_store(config, store).await
    }

    pub async fn with_store(config: ServerConfig, store: SharedStore) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, state) = build_app_with_store(config, Arc::clone(&store));
        let sessions = state.sessions.clone();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            store,
            sessions,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Session token for a player, as the login flow would hand out.
    pub fn login(&self, player_id: &str, display_name: &str) -> String {
        self.sessions
            .issue(&make_identity(player_id, display_name))
            .unwrap()
    }

    pub async fn submit(
        &self,
        client: &reqwest::Client,
        token: &str,
        player_id: &str,
        display_name: &str,
        score: Score,
    ) -> reqwest::Response {
        client
            .post(format!("{}/leaderboard/scores", self.base_url()))
            .bearer_auth(token)
            .json(&serde_json::json!({
                "playerId": player_id,
                "displayName": display_name,
                "score": score,
            }))
            .send()
            .await
            .unwrap()
    }

    /// Log in as `player_id` and submit, expecting success.
    pub async fn submit_ok(
        &self,
        client: &reqwest::Client,
        player_id: &str,
        display_name: &str,
        score: Score,
    ) -> SubmitResult {
        let token = self.login(player_id, display_name);
        let resp = self
            .submit(client, &token, player_id, display_name, score)
            .await;
        assert_eq!(resp.status(), 200, "submit should succeed");
        resp.json().await.unwrap()
    }

    pub async fn top(&self, client: &reqwest::Client, n: usize) -> Vec<LeaderboardEntry> {
        let resp = client
            .get(format!("{}/leaderboard/top?n={n}", self.base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }
}

/// A store whose backend is permanently down.
pub struct UnavailableStore;

impl LeaderboardStore for UnavailableStore {
    fn submit(&self, _: &str, _: Score, _: &str) -> Result<SubmitResult, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn top_n(&self, _: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn standing(&self, _: &str) -> Result<Option<PlayerStanding>, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn player_count(&self) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }
}
