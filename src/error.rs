//! Error type for the store, session and export layers.
//!
//! The scheduling engine itself never fails; it clamps.

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("Item not found: {0}")]
    NotFound(i64),
    #[error("Connection lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, AppError>;
