//! Ladder-based review scheduler.
//!
//! Items climb a fixed ladder of base intervals as their perfect-recall streak grows:
//! - Recall below 50: the item failed, next review tomorrow regardless of stage
//! - Recall 50-79: confidence is held, the current stage interval is used as is
//! - Recall 80+: the interval blends toward the next stage and is scaled by 1.3-1.5
//! - The result is never less than 1 day and never more than 180 days out

use super::ReviewHistoryEntry;
use chrono::{DateTime, Duration, Utc};

/// Base interval in days for each confidence stage.
pub const BASE_INTERVALS: [i64; 7] = [1, 3, 7, 14, 30, 60, 120];

pub const FAILED_RECALL_THRESHOLD: i32 = 50;
pub const STRONG_RECALL_THRESHOLD: i32 = 80;

/// Shortest allowed gap between two reviews.
pub const MIN_INTERVAL_DAYS: i64 = 1;
/// Longest allowed gap: the last ladder step times 1.5.
pub const MAX_INTERVAL_DAYS: i64 = BASE_INTERVALS[BASE_INTERVALS.len() - 1] * 3 / 2;

/// Interval in days before clamping, for a recall score at the given stage.
pub fn interval_days(recall_score: i32, perfect_recall_count: u32) -> f64 {
    let recall_score = recall_score.clamp(0, 100);
    let last = BASE_INTERVALS.len() - 1;
    let stage = (perfect_recall_count as usize).min(last);
    let current_interval = BASE_INTERVALS[stage] as f64;
    let next_interval = BASE_INTERVALS[(stage + 1).min(last)] as f64;

    if recall_score < FAILED_RECALL_THRESHOLD {
        BASE_INTERVALS[0] as f64
    } else if recall_score < STRONG_RECALL_THRESHOLD {
        current_interval
    } else {
        let progress_factor = (recall_score - STRONG_RECALL_THRESHOLD) as f64 / 20.0;
        let blended_interval = current_interval + (next_interval - current_interval) * progress_factor;
        let score_factor = 0.5 + recall_score as f64 / 100.0;
        blended_interval * score_factor
    }
}

/// Calculates when an item should next be reviewed.
///
/// The stage comes from `perfect_recall_count` alone; the history is not consulted, so
/// its ordering cannot affect the result.
pub fn compute_next_review_date(
    recall_score: i32,
    last_reviewed_date: DateTime<Utc>,
    perfect_recall_count: u32,
    _history: &[ReviewHistoryEntry],
) -> DateTime<Utc> {
    let days = interval_days(recall_score, perfect_recall_count)
        .round()
        .clamp(MIN_INTERVAL_DAYS as f64, MAX_INTERVAL_DAYS as f64) as i64;

    last_reviewed_date + Duration::days(days)
}
