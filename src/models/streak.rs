//! Streak and elapsed-time helpers shared by the retention model and the scheduler.

use super::ReviewHistoryEntry;
use chrono::{DateTime, Utc};

/// Recall score at or above which a review counts toward the perfect-recall streak.
pub const HIGH_SCORE_THRESHOLD: u8 = 90;

/// Counts the leading run of reviews scoring at least [`HIGH_SCORE_THRESHOLD`].
/// `history` must be ordered newest-first.
pub fn compute_high_score_streak(history: &[ReviewHistoryEntry]) -> u32 {
    history
        .iter()
        .take_while(|entry| entry.recall_score >= HIGH_SCORE_THRESHOLD)
        .count() as u32
}

/// Whole days between `last_reviewed_date` and now, or 0 when there is no prior review.
pub fn compute_days_since_last_review(last_reviewed_date: Option<DateTime<Utc>>) -> i64 {
    compute_days_since_last_review_at(last_reviewed_date, Utc::now())
}

/// Same as [`compute_days_since_last_review`] against an explicit clock.
/// A last review dated after `now` yields 0.
pub fn compute_days_since_last_review_at(
    last_reviewed_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> i64 {
    match last_reviewed_date {
        Some(last) => (now - last).num_days().max(0),
        None => 0,
    }
}
