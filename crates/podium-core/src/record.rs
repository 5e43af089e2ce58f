use serde::{Deserialize, Serialize};

/// Player scores are whole, non-negative points. Kept signed so that a
/// negative submission can be represented and rejected by validation.
pub type Score = i64;

/// Logical acceptance sequence, assigned by the store on every accepted write.
pub type Seq = u64;

/// The authoritative per-player row owned by a leaderboard store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub player_id: String,
    pub display_name: String,
    pub best_score: Score,
    pub last_updated_seq: Seq,
}

impl PlayerRecord {
    /// Public view of this record, without the internal sequence stamp.
    pub fn entry(&self) -> LeaderboardEntry {
        LeaderboardEntry {
            player_id: self.player_id.clone(),
            display_name: self.display_name.clone(),
            best_score: self.best_score,
        }
    }
}

/// One row of a ranked leaderboard view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub player_id: String,
    pub display_name: String,
    pub best_score: Score,
}

/// A single player's record together with its 1-based position in the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStanding {
    pub player_id: String,
    pub display_name: String,
    pub best_score: Score,
    pub rank: usize,
}

/// Outcome of a score submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    /// Whether the stored record changed.
    pub accepted: bool,
    /// The player's best score after the submission was applied (or rejected).
    pub best_score: Score,
}
