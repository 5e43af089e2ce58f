//! Score update rules: input validation and the upsert-if-greater decision.
//!
//! Everything here is pure. Stores call [`validate_submission`] before taking
//! any lock, then [`decide`] inside their per-player critical section.

use crate::record::{PlayerRecord, Score};

/// Default upper bound on display name length, in characters.
pub const DEFAULT_MAX_DISPLAY_NAME_LEN: usize = 64;

/// Default upper bound on player id length, in bytes.
pub const DEFAULT_MAX_PLAYER_ID_LEN: usize = 128;

/// Size limits applied to incoming submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionLimits {
    pub max_display_name_len: usize,
    pub max_player_id_len: usize,
}

impl Default for SubmissionLimits {
    fn default() -> Self {
        Self {
            max_display_name_len: DEFAULT_MAX_DISPLAY_NAME_LEN,
            max_player_id_len: DEFAULT_MAX_PLAYER_ID_LEN,
        }
    }
}

/// Reasons a submission is rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyPlayerId,
    PlayerIdTooLong { max: usize },
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
    NegativeScore(Score),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPlayerId => write!(f, "playerId must not be empty"),
            Self::PlayerIdTooLong { max } => write!(f, "playerId exceeds {max} bytes"),
            Self::EmptyDisplayName => write!(f, "displayName must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "displayName exceeds {max} characters")
            },
            Self::NegativeScore(score) => {
                write!(f, "score must be non-negative, got {score}")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a submission's shape. Returns the trimmed display name that should be
/// stored if the submission is accepted.
pub fn validate_submission<'a>(
    player_id: &str,
    display_name: &'a str,
    score: Score,
    limits: &SubmissionLimits,
) -> Result<&'a str, ValidationError> {
    if player_id.is_empty() {
        return Err(ValidationError::EmptyPlayerId);
    }
    if player_id.len() > limits.max_player_id_len {
        return Err(ValidationError::PlayerIdTooLong {
            max: limits.max_player_id_len,
        });
    }

    let name = display_name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyDisplayName);
    }
    if name.chars().count() > limits.max_display_name_len {
        return Err(ValidationError::DisplayNameTooLong {
            max: limits.max_display_name_len,
        });
    }

    if score < 0 {
        return Err(ValidationError::NegativeScore(score));
    }

    Ok(name)
}

/// What a store should do with a validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Replace (or create) the record with these values.
    Accept {
        best_score: Score,
        display_name: String,
    },
    /// Leave the record untouched.
    Reject,
}

/// Upsert-if-greater.
///
/// A first submission is always accepted. After that only a strictly higher
/// score is accepted; an exact tie is rejected and does not update the display
/// name either, so the name always belongs to the last accepted score.
pub fn decide(
    existing: Option<&PlayerRecord>,
    submitted_score: Score,
    submitted_name: &str,
) -> Decision {
    match existing {
        Some(record) if submitted_score <= record.best_score => Decision::Reject,
        _ => Decision::Accept {
            best_score: submitted_score,
            display_name: submitted_name.to_string(),
        },
    }
}
