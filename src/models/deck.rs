//! Deck is a named set of learning items
use super::LearningItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub items: Vec<LearningItem>,
}

impl Default for Deck {
    fn default() -> Self {
        Self {
            name: "My Deck".to_string(),
            items: Vec::new(),
        }
    }
}

impl Deck {
    /// Items due at `now`, most overdue first. New items come last.
    pub fn due_items(&self, now: DateTime<Utc>) -> Vec<&LearningItem> {
        let mut due: Vec<_> = self.items.iter().filter(|item| item.is_due(now)).collect();
        due.sort_by_key(|item| (item.next_review_date.is_none(), item.next_review_date));
        due
    }

    pub fn mastery_candidates(&self) -> Vec<&LearningItem> {
        self.items
            .iter()
            .filter(|item| item.is_mastery_suggested())
            .collect()
    }

    /// Removes an item together with its history. Returns the removed item.
    pub fn archive(&mut self, item_id: i64) -> Option<LearningItem> {
        let position = self.items.iter().position(|item| item.id == item_id)?;
        Some(self.items.remove(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn deck_with_reviews(now: DateTime<Utc>) -> Deck {
        let mut fresh = LearningItem::new("proszę", "please");
        fresh.id = 1;

        let mut weak = LearningItem::new("cześć", "hello");
        weak.id = 2;
        weak.record_review(20, now - Duration::days(5));

        let mut strong = LearningItem::new("dziękuję", "thank you");
        strong.id = 3;
        let mut at = now - Duration::days(1);
        for _ in 0..4 {
            at = strong.record_review(100, at).next_review_date;
        }

        Deck {
            name: "Polish Vocabulary".to_string(),
            items: vec![fresh, weak, strong],
        }
    }

    #[test]
    fn test_due_items_order() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let deck = deck_with_reviews(now);

        let due: Vec<i64> = deck.due_items(now).iter().map(|item| item.id).collect();
        assert_eq!(due, vec![2, 1]);
    }

    #[test]
    fn test_mastery_candidates() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let deck = deck_with_reviews(now);

        let candidates: Vec<i64> = deck.mastery_candidates().iter().map(|item| item.id).collect();
        assert_eq!(candidates, vec![3]);
    }

    #[test]
    fn test_archive_removes_item_and_history() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut deck = deck_with_reviews(now);

        let archived = deck.archive(3).unwrap();
        assert_eq!(archived.history.len(), 4);
        assert_eq!(deck.items.len(), 2);
        assert!(deck.archive(3).is_none());
    }
}
