use std::cmp::Ordering;

use crate::{Name, UserID};

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub user_id: UserID,
    pub name: Name,
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub rank: u32,
    pub entry: LeaderboardEntry,
}

/// Rank users by their best value in descending order.
///
/// Users with the same value share a rank and the following rank is skipped ("1224" ranking).
/// Ties are listed by name. Entries without a positive value are not ranked.
#[must_use]
pub fn rank(entries: Vec<LeaderboardEntry>) -> Vec<Ranking> {
    let mut entries = entries
        .into_iter()
        .filter(|e| e.value > 0.0)
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| match b.value.total_cmp(&a.value) {
        Ordering::Equal => a.name.cmp(&b.name),
        ordering => ordering,
    });

    let mut result: Vec<Ranking> = Vec::with_capacity(entries.len());
    for (position, entry) in (1..).zip(entries) {
        #[allow(clippy::float_cmp)]
        let rank = match result.last() {
            Some(previous) if previous.entry.value == entry.value => previous.rank,
            _ => position,
        };
        result.push(Ranking { rank, entry });
    }
    result
}
