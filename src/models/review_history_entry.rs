//! A single completed review of a learning item.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record appended to an item's history on every review.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewHistoryEntry {
    pub date: DateTime<Utc>,
    pub recall_score: u8,
    pub retention_score: u8,
}

impl ReviewHistoryEntry {
    pub fn new(date: DateTime<Utc>, recall_score: u8, retention_score: u8) -> Self {
        Self {
            date,
            recall_score: recall_score.min(100),
            retention_score: retention_score.min(100),
        }
    }
}

/// True when `history` is ordered newest-first (ties allowed).
pub fn is_newest_first(history: &[ReviewHistoryEntry]) -> bool {
    history.windows(2).all(|pair| pair[0].date >= pair[1].date)
}
