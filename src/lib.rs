pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use error::{AppError, Result};
pub use models::{
    BASE_INTERVALS, Deck, DeckSet, LearningItem, ReviewHistoryEntry, ReviewOutcome, ReviewSession,
    ReviewState, compute_days_since_last_review, compute_days_since_last_review_at,
    compute_high_score_streak, compute_next_review_date, compute_retention_score,
};
