//! Review session management for spaced repetition practice.
//! Handles multi-round review of due items with the retention/scheduling engine.

use super::scheduler::FAILED_RECALL_THRESHOLD;
use super::{LearningItem, ReviewOutcome};
use crate::database::db;
use crate::error::{AppError, Result};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// A due item together with its progress in the current session.
pub struct SessionItem {
    pub item: LearningItem,
    pub passed: bool,
}

/// Manages a review session with multiple rounds.
/// Items recalled below 50 are repeated in subsequent rounds.
pub struct ReviewSession {
    pub deck_name: String,
    pub all_items: Vec<SessionItem>,
    pub current_round_items: Vec<usize>,
    pub current_index: usize,
    pub conn: Arc<Mutex<Connection>>,
    pub round_number: usize,
}

impl ReviewSession {
    /// Creates a new review session from the deck's items that are due now.
    pub fn new_from_due_items(deck_name: String, conn: Arc<Mutex<Connection>>) -> Result<Self> {
        let items = {
            let guard = conn.lock().map_err(|_| AppError::LockPoisoned)?;
            db::get_items_due_for_review(&deck_name, &guard)?
        };
        tracing::info!(deck = %deck_name, due = items.len(), "review session started");

        let all_items: Vec<_> = items
            .into_iter()
            .map(|item| SessionItem {
                item,
                passed: false,
            })
            .collect();
        let indices: Vec<usize> = (0..all_items.len()).collect();

        Ok(Self {
            deck_name,
            all_items,
            current_round_items: indices,
            current_index: 0,
            conn,
            round_number: 1,
        })
    }

    pub fn current_item(&self) -> Option<&LearningItem> {
        self.current_round_items
            .get(self.current_index)
            .and_then(|&idx| self.all_items.get(idx).map(|entry| &entry.item))
    }

    pub fn next_item(&mut self) {
        if self.current_index + 1 < self.current_round_items.len() {
            self.current_index += 1;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the items that failed. If none failed, the session is complete.
    fn start_next_round(&mut self) {
        let failed_indices: Vec<usize> = self
            .current_round_items
            .iter()
            .copied()
            .filter(|&idx| {
                self.all_items
                    .get(idx)
                    .map(|entry| !entry.passed)
                    .unwrap_or(false)
            })
            .collect();

        if !failed_indices.is_empty() {
            self.current_round_items = failed_indices;
            self.current_index = 0;
            self.round_number += 1;
            tracing::debug!(
                round = self.round_number,
                retry = self.current_round_items.len(),
                "starting retry round"
            );
        }
    }

    /// Grades the current item with a recall score (0-100) and stores the review.
    /// Items recalled at 50 or above count as passed for this session.
    pub fn grade_current_item(&mut self, recall_score: i32) -> Result<Option<ReviewOutcome>> {
        let Some(&actual_idx) = self.current_round_items.get(self.current_index) else {
            return Ok(None);
        };
        let Some(entry) = self.all_items.get_mut(actual_idx) else {
            return Ok(None);
        };

        let outcome = {
            let mut conn = self.conn.lock().map_err(|_| AppError::LockPoisoned)?;
            db::record_review(entry.item.id, recall_score, &mut conn)?
        };

        entry.passed = recall_score >= FAILED_RECALL_THRESHOLD;
        // keep the in-memory copy in step with the store
        entry.item.history.insert(0, outcome.entry.clone());
        entry.item.last_reviewed_date = Some(outcome.entry.date);
        entry.item.next_review_date = Some(outcome.next_review_date);
        entry.item.recall_score = outcome.entry.recall_score;
        entry.item.perfect_recall_count = outcome.perfect_recall_count;

        Ok(Some(outcome))
    }

    pub fn passed_count(&self) -> usize {
        self.current_round_items
            .iter()
            .filter(|&&idx| {
                self.all_items
                    .get(idx)
                    .map(|entry| entry.passed)
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round_items.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.passed_count()
    }

    /// Returns true when the round is empty or every item in it passed.
    pub fn is_completed(&self) -> bool {
        self.current_round_items.is_empty() || self.passed_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} items", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Review): {} items to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn shared_conn() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        db::init_database(&conn).unwrap();
        db::set_current_date(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), &conn).unwrap();
        db::new_deck("Polish Vocabulary", &conn).unwrap();
        db::add_item("Polish Vocabulary", "cześć", "hello", &conn).unwrap();
        db::add_item("Polish Vocabulary", "dziękuję", "thank you", &conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_session_starts_with_due_items() {
        let session = ReviewSession::new_from_due_items("Polish Vocabulary".to_string(), shared_conn()).unwrap();
        assert_eq!(session.total_count(), 2);
        assert_eq!(session.current_item().unwrap().term, "cześć");
        assert_eq!(session.phase_message(), "Round 1: 2 items");
    }

    #[test]
    fn test_failed_items_are_repeated() {
        let mut session = ReviewSession::new_from_due_items("Polish Vocabulary".to_string(), shared_conn()).unwrap();

        session.grade_current_item(20).unwrap();
        session.next_item();
        session.grade_current_item(85).unwrap();
        assert_eq!(session.remaining_count(), 1);
        session.next_item();

        assert_eq!(session.round_number, 2);
        assert_eq!(session.total_count(), 1);
        assert_eq!(session.current_item().unwrap().term, "cześć");
        assert!(!session.is_completed());

        session.grade_current_item(60).unwrap();
        assert!(session.is_completed());
    }

    #[test]
    fn test_grading_persists_review() {
        let conn = shared_conn();
        let mut session = ReviewSession::new_from_due_items("Polish Vocabulary".to_string(), Arc::clone(&conn)).unwrap();

        let outcome = session.grade_current_item(95).unwrap().unwrap();
        assert_eq!(outcome.perfect_recall_count, 1);

        let guard = conn.lock().unwrap();
        let id = session.current_item().unwrap().id;
        let stored = db::load_item(id, &guard).unwrap();
        assert_eq!(stored.history.len(), 1);
        assert_eq!(stored.next_review_date, Some(outcome.next_review_date));
        assert_eq!(session.current_item().unwrap().history, stored.history);
    }
}
