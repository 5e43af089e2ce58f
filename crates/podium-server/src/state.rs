use std::sync::Arc;

use crate::auth::SessionSigner;
use crate::config::ServerConfig;
use crate::store::{LeaderboardStore, ShardedStore};

pub type SharedStore = Arc<dyn LeaderboardStore>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub sessions: SessionSigner,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// State backed by the in-memory sharded store.
    pub fn new(config: ServerConfig) -> Self {
        let store = ShardedStore::with_shards(
            config.leaderboard.shard_count,
            config.leaderboard.submission_limits(),
        );
        Self::with_store(config, Arc::new(store))
    }

    /// State backed by an arbitrary store implementation.
    pub fn with_store(config: ServerConfig, store: SharedStore) -> Self {
        let sessions = match config.auth.session_secret {
            Some(ref secret) => SessionSigner::new(secret),
            None => {
                tracing::warn!(
                    "No session_secret configured, generated a random one. Sessions will not survive a restart"
                );
                SessionSigner::random()
            },
        };
        Self {
            store,
            sessions,
            config: Arc::new(config),
        }
    }
}
