use std::cmp::Ordering;

use crate::record::{LeaderboardEntry, PlayerRecord, PlayerStanding};

/// Leaderboard order: higher score first, then earlier acceptance first.
///
/// Every accepted write carries a distinct sequence number, so this is a total
/// order over the records of one store.
pub fn rank_order(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    b.best_score
        .cmp(&a.best_score)
        .then_with(|| a.last_updated_seq.cmp(&b.last_updated_seq))
}

/// Whether `a` is placed above `b`.
pub fn outranks(a: &PlayerRecord, b: &PlayerRecord) -> bool {
    rank_order(a, b) == Ordering::Less
}

/// Select and order the `n` best records.
pub fn top_n<'a, I>(records: I, n: usize) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = &'a PlayerRecord>,
{
    if n == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<&PlayerRecord> = records.into_iter().collect();
    if ranked.len() > n {
        ranked.select_nth_unstable_by(n - 1, |a, b| rank_order(a, b));
        ranked.truncate(n);
    }
    ranked.sort_unstable_by(|a, b| rank_order(a, b));
    ranked.into_iter().map(PlayerRecord::entry).collect()
}

/// Look up one player and compute their 1-based rank.
pub fn standing<'a, I>(records: I, player_id: &str) -> Option<PlayerStanding>
where
    I: IntoIterator<Item = &'a PlayerRecord> + Clone,
{
    let target = records
        .clone()
        .into_iter()
        .find(|r| r.player_id == player_id)?;
    let above = records
        .into_iter()
        .filter(|r| outranks(r, target))
        .count();
    Some(PlayerStanding {
        player_id: target.player_id.clone(),
        display_name: target.display_name.clone(),
        best_score: target.best_score,
        rank: above + 1,
    })
}
