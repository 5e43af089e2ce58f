pub mod caller;
pub mod policy;
pub mod ranking;
pub mod record;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::caller::Identity;

    /// Create a login identity.
    pub fn make_identity(player_id: &str, display_name: &str) -> Identity {
        Identity {
            player_id: player_id.to_string(),
            display_name: display_name.to_string(),
        }
    }

    /// `n` distinct player ids: `player-0`, `player-1`, ...
    pub fn player_ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("player-{i}")).collect()
    }
}
