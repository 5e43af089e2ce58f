use serde::Deserialize;

use podium_core::policy::{
    DEFAULT_MAX_DISPLAY_NAME_LEN, DEFAULT_MAX_PLAYER_ID_LEN, SubmissionLimits,
};

/// Default config file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "podium.toml";

/// Top-level server configuration, loaded from `podium.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub auth: AuthFileConfig,
    pub leaderboard: LeaderboardConfig,
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            auth: AuthFileConfig::default(),
            leaderboard: LeaderboardConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Auth section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthFileConfig {
    /// HMAC key for session tokens. None = a random key is generated at
    /// startup and sessions do not survive a restart.
    pub session_secret: Option<String>,
}

/// Leaderboard shape and input limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Entries returned by `GET /leaderboard/top` when `n` is omitted.
    pub default_top_n: usize,
    /// Larger `n` values are clamped to this.
    pub max_top_n: usize,
    /// Number of independently locked partitions in the in-memory store.
    pub shard_count: usize,
    pub max_display_name_len: usize,
    pub max_player_id_len: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            default_top_n: 10,
            max_top_n: 100,
            shard_count: 16,
            max_display_name_len: DEFAULT_MAX_DISPLAY_NAME_LEN,
            max_player_id_len: DEFAULT_MAX_PLAYER_ID_LEN,
        }
    }
}

impl LeaderboardConfig {
    pub fn submission_limits(&self) -> SubmissionLimits {
        SubmissionLimits {
            max_display_name_len: self.max_display_name_len,
            max_player_id_len: self.max_player_id_len,
        }
    }
}

/// Infrastructure limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
        }
    }
}

/// A configuration value that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConfigError {}

fn invalid(msg: &str) -> Result<(), ConfigError> {
    Err(ConfigError(msg.to_string()))
}

impl ServerConfig {
    /// Validate configuration. Hard errors are returned, smells are logged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError(format!(
                "listen_addr {:?} is not a valid socket address",
                self.listen_addr
            )));
        }

        if let Some(ref secret) = self.auth.session_secret
            && secret.len() < 16
        {
            tracing::warn!(len = secret.len(), "session_secret is shorter than 16 bytes");
        }

        let lb = &self.leaderboard;
        if lb.default_top_n == 0 {
            return invalid("leaderboard.default_top_n must be > 0");
        }
        if lb.max_top_n == 0 {
            return invalid("leaderboard.max_top_n must be > 0");
        }
        if lb.default_top_n > lb.max_top_n {
            return invalid("leaderboard.default_top_n must not exceed max_top_n");
        }
        if lb.shard_count == 0 {
            return invalid("leaderboard.shard_count must be > 0");
        }
        if lb.max_display_name_len == 0 {
            return invalid("leaderboard.max_display_name_len must be > 0");
        }
        if lb.max_player_id_len == 0 {
            return invalid("leaderboard.max_player_id_len must be > 0");
        }

        if self.limits.request_timeout_secs == 0 {
            return invalid("limits.request_timeout_secs must be > 0");
        }

        Ok(())
    }

    /// Load config from `PODIUM_CONFIG` (or `podium.toml`) if it exists, then
    /// apply env var overrides.
    pub fn load() -> Self {
        let path = std::env::var("PODIUM_CONFIG")
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!(%path, "Loaded configuration");
                    if cfg.auth.session_secret.is_some() {
                        tracing::warn!(
                            "session_secret is set in config file, use PODIUM_SESSION_SECRET env var in production"
                        );
                    }
                    cfg
                },
                Err(e) => {
                    tracing::warn!(%path, "Failed to parse config: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!(%path, "No config file found, using defaults");
                ServerConfig::default()
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply `PODIUM_*` overrides looked up through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = var("PODIUM_LISTEN_ADDR")
            && !addr.is_empty()
        {
            self.listen_addr = addr;
        }
        if let Some(secret) = var("PODIUM_SESSION_SECRET")
            && !secret.is_empty()
        {
            self.auth.session_secret = Some(secret);
        }

        if let Ok(val) = std::env::var("PODIUM_DEFAULT_TOP_N")
            && let Ok(n) = val.parse::<usize>()
        {
            self.leaderboard.default_top_n = n;
        }
        if let Ok(val) = std::env::var("PODIUM_MAX_TOP_N")
            && let Ok(n) = val.parse::<usize>()
        {
            self.leaderboard.max_top_n = n;
        }
        if let Ok(val) = std::env::var("PODIUM_SHARD_COUNT")
            && let Ok(n) = val.parse::<usize>()
        {
            self.leaderboard.shard_count = n;
        }

        if let Ok(val) = std::env::var("PODIUM_REQUEST_TIMEOUT_SECS")
            && let Ok(n) = val.parse::<u64>()
        {
            self.limits.request_timeout_secs = n;
        }
    }
}
