//! Retention model: post-review estimate of long-term memory strength.
//!
//! - The recall score is the base
//! - A successful recall (>= 50) after a long gap earns a spacing bonus of one point
//!   per three days, up to 20
//! - Every review in the current perfect-recall streak adds 3 points, up to 15
//! - A failed recall earns no spacing credit: a long gap followed by a miss is forgetting

/// Recall score from which elapsed time counts as consolidation.
pub const SPACING_THRESHOLD: i32 = 50;
pub const MAX_SPACING_BONUS: i64 = 20;
pub const MAX_REINFORCEMENT_BONUS: u32 = 15;
const REINFORCEMENT_PER_REVIEW: u32 = 3;

/// Computes the retention score (0-100) for a review that just completed.
///
/// Out-of-range inputs are clamped. With `review_count == 0` there is no prior data, so
/// elapsed days and streak are ignored.
pub fn compute_retention_score(
    recall_score: i32,
    days_since_last_review: i64,
    review_count: u32,
    high_score_streak: u32,
) -> u8 {
    let recall_score = recall_score.clamp(0, 100);
    let (days, streak) = if review_count == 0 {
        (0, 0)
    } else {
        (days_since_last_review.max(0), high_score_streak)
    };

    let spacing_bonus = if recall_score >= SPACING_THRESHOLD {
        (days / 3).min(MAX_SPACING_BONUS)
    } else {
        0
    };
    let reinforcement_bonus = streak
        .saturating_mul(REINFORCEMENT_PER_REVIEW)
        .min(MAX_REINFORCEMENT_BONUS);

    let score = recall_score as i64 + spacing_bonus + reinforcement_bonus as i64;
    score.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_review_is_recall_score() {
        assert_eq!(compute_retention_score(50, 0, 0, 0), 50);
        // prior-data inputs are ignored without a prior review
        assert_eq!(compute_retention_score(50, 60, 0, 5), 50);
    }

    #[test]
    fn test_spacing_bonus_for_successful_recall() {
        // 30 days / 3 = 10
        assert_eq!(compute_retention_score(60, 30, 3, 0), 70);
        // capped at 20
        assert_eq!(compute_retention_score(60, 300, 3, 0), 80);
    }

    #[test]
    fn test_no_spacing_bonus_for_failed_recall() {
        assert_eq!(compute_retention_score(40, 90, 3, 0), 40);
        assert_eq!(compute_retention_score(40, 90, 3, 2), 46);
    }

    #[test]
    fn test_reinforcement_bonus_capped() {
        assert_eq!(compute_retention_score(60, 0, 10, 2), 66);
        assert_eq!(compute_retention_score(60, 0, 10, 50), 75);
    }

    #[test]
    fn test_total_is_capped_at_100() {
        assert_eq!(compute_retention_score(95, 60, 8, 5), 100);
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        assert_eq!(compute_retention_score(-20, -5, 1, 0), 0);
        assert_eq!(compute_retention_score(250, 0, 1, 0), 100);
        assert_eq!(compute_retention_score(70, -30, 1, 0), 70);
    }

    #[test]
    fn test_monotonic_in_recall_score() {
        let mut previous = 0;
        for recall in 0..=100 {
            let score = compute_retention_score(recall, 21, 4, 2);
            assert!(score >= previous, "dropped at recall {}", recall);
            previous = score;
        }
    }
}
