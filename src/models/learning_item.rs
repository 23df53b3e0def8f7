//! A learning item and its review lifecycle.
//!
//! New -> Scheduled on the first review, Scheduled <-> Overdue as the clock passes the
//! next review date, and back to Scheduled on every review. Mastery is only a suggestion;
//! archiving is done by the owner of the item.

use super::retention::compute_retention_score;
use super::scheduler::compute_next_review_date;
use super::streak::{compute_days_since_last_review_at, compute_high_score_streak};
use super::review_history_entry::is_newest_first;
use super::ReviewHistoryEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Perfect-recall streak from which archiving the item is suggested.
pub const MASTERY_STREAK: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewState {
    /// Never reviewed.
    New,
    Scheduled,
    /// Past its next review date.
    Overdue,
}

/// What a completed review produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub entry: ReviewHistoryEntry,
    pub next_review_date: DateTime<Utc>,
    pub perfect_recall_count: u32,
    pub mastery_suggested: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LearningItem {
    #[serde(default)]
    pub id: i64,
    pub term: String,
    pub definition: String,
    pub last_reviewed_date: Option<DateTime<Utc>>,
    pub next_review_date: Option<DateTime<Utc>>,
    pub recall_score: u8,
    pub perfect_recall_count: u32,
    /// Newest first.
    pub history: Vec<ReviewHistoryEntry>,
}

impl LearningItem {
    pub fn new(term: &str, definition: &str) -> Self {
        Self {
            id: 0,
            term: term.to_string(),
            definition: definition.to_string(),
            last_reviewed_date: None,
            next_review_date: None,
            recall_score: 0,
            perfect_recall_count: 0,
            history: Vec::new(),
        }
    }

    pub fn review_count(&self) -> usize {
        self.history.len()
    }

    pub fn review_state(&self, now: DateTime<Utc>) -> ReviewState {
        match self.next_review_date {
            None => ReviewState::New,
            Some(next) if now > next => ReviewState::Overdue,
            Some(_) => ReviewState::Scheduled,
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.review_state(now) == ReviewState::Overdue
    }

    /// New items and items whose review date has arrived.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date.is_none_or(|next| next <= now)
    }

    pub fn is_mastery_suggested(&self) -> bool {
        self.perfect_recall_count >= MASTERY_STREAK
    }

    /// Records a review completed at `now`.
    ///
    /// The retention score is computed from the history as it stood before this review;
    /// the streak and next review date from the history including it.
    ///
    /// A review is never dated before the latest recorded one: a `now` behind it (clock
    /// moved back, imported history from the future) is raised to that date so the new
    /// entry stays the most recent.
    pub fn record_review(&mut self, recall_score: i32, now: DateTime<Utc>) -> ReviewOutcome {
        let recall_score = recall_score.clamp(0, 100);
        if !is_newest_first(&self.history) {
            self.history.sort_by(|a, b| b.date.cmp(&a.date));
        }
        let now = self
            .history
            .first()
            .map(|latest| latest.date)
            .into_iter()
            .chain(self.last_reviewed_date)
            .fold(now, |latest, date| latest.max(date));
        let review_count = self.history.len() as u32;

        let (days_since, streak) = if review_count == 0 {
            (0, 0)
        } else {
            (
                compute_days_since_last_review_at(self.last_reviewed_date, now),
                compute_high_score_streak(&self.history),
            )
        };
        let retention_score =
            compute_retention_score(recall_score, days_since, review_count, streak);

        let entry = ReviewHistoryEntry::new(now, recall_score as u8, retention_score);
        self.history.insert(0, entry.clone());

        self.perfect_recall_count = compute_high_score_streak(&self.history);
        self.recall_score = recall_score as u8;
        self.last_reviewed_date = Some(now);
        let next_review_date =
            compute_next_review_date(recall_score, now, self.perfect_recall_count, &self.history);
        self.next_review_date = Some(next_review_date);

        ReviewOutcome {
            entry,
            next_review_date,
            perfect_recall_count: self.perfect_recall_count,
            mastery_suggested: self.is_mastery_suggested(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn jan_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_item_creation() {
        let item = LearningItem::new("hello", "cześć");
        assert_eq!(item.term, "hello");
        assert_eq!(item.review_count(), 0);
        assert_eq!(item.review_state(jan_first()), ReviewState::New);
        assert!(item.is_due(jan_first()));
    }

    #[test]
    fn test_first_review_schedules_item() {
        let mut item = LearningItem::new("hello", "cześć");
        let outcome = item.record_review(50, jan_first());

        assert_eq!(outcome.entry.retention_score, 50);
        assert_eq!(outcome.next_review_date, jan_first() + Duration::days(1));
        assert_eq!(item.history.len(), 1);
        assert_eq!(item.perfect_recall_count, 0);
        assert_eq!(item.review_state(jan_first()), ReviewState::Scheduled);
    }

    #[test]
    fn test_overdue_is_derived_from_clock() {
        let mut item = LearningItem::new("hello", "cześć");
        item.record_review(60, jan_first());

        assert!(!item.is_overdue(jan_first() + Duration::hours(12)));
        assert!(item.is_due(jan_first() + Duration::days(1)));
        assert!(item.is_overdue(jan_first() + Duration::days(2)));
    }

    #[test]
    fn test_streak_grows_and_resets() {
        let mut item = LearningItem::new("hello", "cześć");
        let mut now = jan_first();
        for expected in 1..=3 {
            let outcome = item.record_review(95, now);
            assert_eq!(outcome.perfect_recall_count, expected);
            now = outcome.next_review_date;
        }

        let outcome = item.record_review(70, now);
        assert_eq!(outcome.perfect_recall_count, 0);
        assert_eq!(item.history.len(), 4);
    }

    #[test]
    fn test_four_perfect_reviews_suggest_mastery() {
        let mut item = LearningItem::new("hello", "cześć");
        let mut now = jan_first();
        let mut outcome = item.record_review(100, now);
        for _ in 0..3 {
            assert!(!outcome.mastery_suggested);
            now = outcome.next_review_date;
            outcome = item.record_review(92, now);
        }

        assert_eq!(item.perfect_recall_count, 4);
        assert!(outcome.mastery_suggested);
        assert!(item.is_mastery_suggested());
    }

    #[test]
    fn test_retention_uses_prior_streak_and_gap() {
        let mut item = LearningItem::new("hello", "cześć");
        item.record_review(95, jan_first());
        item.record_review(95, jan_first() + Duration::days(4));

        // 9 days since the last review -> +3, prior streak of 2 -> +6
        let outcome = item.record_review(70, jan_first() + Duration::days(13));
        assert_eq!(outcome.entry.retention_score, 79);
    }

    #[test]
    fn test_history_stays_newest_first() {
        let mut item = LearningItem::new("hello", "cześć");
        item.record_review(40, jan_first());
        item.record_review(90, jan_first() + Duration::days(1));

        assert_eq!(item.history[0].recall_score, 90);
        assert_eq!(item.history[1].recall_score, 40);
    }

    #[test]
    fn test_review_with_clock_behind_last_review() {
        let march = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let february = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let mut item = LearningItem::new("hello", "cześć");
        item.record_review(95, march);

        let outcome = item.record_review(40, february);
        assert_eq!(outcome.entry.date, march);
        assert_eq!(outcome.perfect_recall_count, 0);
        assert_eq!(outcome.next_review_date, march + Duration::days(1));
        assert_eq!(item.history[0].recall_score, 40);
        assert!(is_newest_first(&item.history));
    }

    #[test]
    fn test_unsorted_history_is_sorted_before_review() {
        let mut item = LearningItem::new("hello", "cześć");
        item.history = vec![
            ReviewHistoryEntry::new(jan_first(), 30, 30),
            ReviewHistoryEntry::new(jan_first() + Duration::days(5), 95, 95),
        ];

        let outcome = item.record_review(92, jan_first() + Duration::days(2));
        assert_eq!(outcome.entry.date, jan_first() + Duration::days(5));
        assert_eq!(outcome.perfect_recall_count, 2);
        let scores: Vec<u8> = item.history.iter().map(|entry| entry.recall_score).collect();
        assert_eq!(scores, vec![92, 95, 30]);
    }

    #[test]
    fn test_next_review_at_least_one_day_out() {
        let mut item = LearningItem::new("hello", "cześć");
        let now = jan_first();
        for score in [0, 20, 55, 85, 100] {
            let outcome = item.record_review(score, now);
            assert!(outcome.next_review_date >= now + Duration::days(1));
        }
    }
}
