//! The authoritative leaderboard store.
//!
//! [`ShardedStore`] keeps records in a [`DashMap`]. A submit holds the entry
//! for its player (and with it that shard's write lock) for its whole
//! read-decide-write cycle, so submissions for the same player are serialized
//! while players in other shards proceed in parallel.
//!
//! Writers also hold a shared guard on a snapshot gate. Readers take the gate
//! exclusively, copy every record out and release it before ranking, which
//! gives a snapshot of the whole collection at a single instant. Writers never
//! wait on each other through the gate.
//!
//! Nothing inside a critical section awaits, so a cancelled request can never
//! leave a decision applied without its write.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use podium_core::policy::{self, Decision, SubmissionLimits, ValidationError};
use podium_core::ranking;
use podium_core::record::{
    LeaderboardEntry, PlayerRecord, PlayerStanding, Score, SubmitResult,
};

/// Default number of shards when none is configured.
const DEFAULT_SHARD_COUNT: usize = 16;

/// Failures surfaced by a leaderboard store. There is deliberately no conflict
/// variant: concurrent submissions are resolved by the update policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Malformed input. Nothing was changed.
    InvalidSubmission(ValidationError),
    /// The backing storage could not be used. Prior state is intact and the
    /// caller may retry with backoff.
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSubmission(e) => write!(f, "invalid submission: {e}"),
            Self::Unavailable(m) => write!(f, "store unavailable: {m}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSubmission(e) => Some(e),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        Self::InvalidSubmission(e)
    }
}

/// Keyed collection of player records with atomic upsert-if-greater and
/// ranked reads. Implementations never retry internally.
pub trait LeaderboardStore: Send + Sync {
    /// Apply a score submission for `player_id`.
    fn submit(
        &self,
        player_id: &str,
        score: Score,
        display_name: &str,
    ) -> Result<SubmitResult, StoreError>;

    /// The `n` best players, best first. Ties go to whoever reached the score
    /// first.
    fn top_n(&self, n: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;

    /// One player's record and rank, if they have one.
    fn standing(&self, player_id: &str) -> Result<Option<PlayerStanding>, StoreError>;

    /// Number of players with a record.
    fn player_count(&self) -> Result<usize, StoreError>;
}

/// In-memory store with per-shard locking.
pub struct ShardedStore {
    records: DashMap<String, PlayerRecord>,
    snapshot_gate: RwLock<()>,
    next_seq: AtomicU64,
    limits: SubmissionLimits,
}

impl Default for ShardedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardedStore {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARD_COUNT, SubmissionLimits::default())
    }

    /// Create a store with about `shard_count` partitions. DashMap needs a
    /// power of two above one, so the count is rounded up to that.
    pub fn with_shards(shard_count: usize, limits: SubmissionLimits) -> Self {
        let shard_amount = shard_count.max(2).next_power_of_two();
        Self {
            records: DashMap::with_shard_amount(shard_amount),
            snapshot_gate: RwLock::new(()),
            next_seq: AtomicU64::new(1),
            limits,
        }
    }

    /// Copy every record out while no write is in flight.
    fn snapshot(&self) -> Result<Vec<PlayerRecord>, StoreError> {
        let _gate = self.snapshot_gate.write().map_err(|_| poisoned())?;
        Ok(self.records.iter().map(|r| r.value().clone()).collect())
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("snapshot gate poisoned".to_string())
}

impl LeaderboardStore for ShardedStore {
    fn submit(
        &self,
        player_id: &str,
        score: Score,
        display_name: &str,
    ) -> Result<SubmitResult, StoreError> {
        let name = policy::validate_submission(player_id, display_name, score, &self.limits)?;

        let _gate = self.snapshot_gate.read().map_err(|_| poisoned())?;
        let entry = self.records.entry(player_id.to_string());
        let existing = match &entry {
            Entry::Occupied(occupied) => Some(occupied.get()),
            Entry::Vacant(_) => None,
        };
        let current_best = existing.map(|r| r.best_score);

        match policy::decide(existing, score, name) {
            Decision::Accept {
                best_score,
                display_name,
            } => {
                // Stamped under the entry lock, so sequence order matches the
                // order in which writes to this player became visible.
                let record = PlayerRecord {
                    player_id: player_id.to_string(),
                    display_name,
                    best_score,
                    last_updated_seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                };
                match entry {
                    Entry::Occupied(mut occupied) => {
                        occupied.insert(record);
                    },
                    Entry::Vacant(vacant) => {
                        vacant.insert(record);
                    },
                }
                Ok(SubmitResult {
                    accepted: true,
                    best_score,
                })
            },
            // Reject only happens when a record already exists
            Decision::Reject => Ok(SubmitResult {
                accepted: false,
                best_score: current_best.unwrap_or(score),
            }),
        }
    }

    fn top_n(&self, n: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let records = self.snapshot()?;
        Ok(ranking::top_n(&records, n))
    }

    fn standing(&self, player_id: &str) -> Result<Option<PlayerStanding>, StoreError> {
        let records = self.snapshot()?;
        Ok(ranking::standing(&records, player_id))
    }

    fn player_count(&self) -> Result<usize, StoreError> {
        let _gate = self.snapshot_gate.write().map_err(|_| poisoned())?;
        Ok(self.records.len())
    }
}
