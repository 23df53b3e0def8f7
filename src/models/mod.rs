pub mod deck;
pub mod deck_set;
pub mod learning_item;
pub mod retention;
pub mod review_history_entry;
pub mod review_session;
pub mod scheduler;
pub mod streak;

pub use deck::Deck;
pub use deck_set::DeckSet;
pub use learning_item::{LearningItem, MASTERY_STREAK, ReviewOutcome, ReviewState};
pub use retention::compute_retention_score;
pub use review_history_entry::ReviewHistoryEntry;
pub use review_session::ReviewSession;
pub use scheduler::{BASE_INTERVALS, compute_next_review_date};
pub use streak::{
    compute_days_since_last_review, compute_days_since_last_review_at, compute_high_score_streak,
};
