//! Database operations for the review store
//!
//! Handles SQLite schema creation, CRUD for decks and learning items, and the
//! append-only review history. History always leaves this module sorted newest-first.

use crate::error::{AppError, Result};
use crate::models::{
    Deck, DeckSet, LearningItem, ReviewHistoryEntry, ReviewOutcome, compute_high_score_streak,
};
use chrono::{DateTime, Duration, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use std::path::Path;

const ITEM_COLUMNS: &str = "id, term, definition, last_reviewed_at, next_review_at, recall_score, perfect_recall_count";

fn to_timestamp(date: DateTime<Utc>) -> i64 {
    date.timestamp()
}

fn timestamp_column(row: &Row<'_>, column: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let Some(secs) = row.get::<_, Option<i64>>(column)? else {
        return Ok(None);
    };
    DateTime::from_timestamp(secs, 0).map(Some).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            Type::Integer,
            Box::new(AppError::InvalidTimestamp(secs.to_string())),
        )
    })
}

fn required_timestamp_column(row: &Row<'_>, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    timestamp_column(row, column)?.ok_or(rusqlite::Error::InvalidColumnType(
        column,
        "reviewed_at".to_string(),
        Type::Null,
    ))
}

/// Scores are stored as plain integers; anything outside 0-100 is clamped on the way out.
fn score_column(row: &Row<'_>, column: usize) -> rusqlite::Result<u8> {
    let score: i64 = row.get(column)?;
    Ok(score.clamp(0, 100) as u8)
}

/// Opens (or creates) the database file and makes sure the schema exists
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_database(&conn)?;
    tracing::info!(path = %path.display(), "review store opened");
    Ok(conn)
}

/// Creates tables for decks, items, review history and app state.
///
/// Sets the current date to now if not already initialized.
pub fn init_database(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS decks (
            name TEXT PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deck_name TEXT NOT NULL,
            term TEXT NOT NULL,
            definition TEXT NOT NULL,
            last_reviewed_at INTEGER,
            next_review_at INTEGER,
            recall_score INTEGER NOT NULL DEFAULT 0,
            perfect_recall_count INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (deck_name) REFERENCES decks(name) ON DELETE CASCADE,
            UNIQUE(deck_name, term)
        );

        CREATE TABLE IF NOT EXISTS review_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            item_id INTEGER NOT NULL,
            reviewed_at INTEGER NOT NULL,
            recall_score INTEGER NOT NULL,
            retention_score INTEGER NOT NULL,
            FOREIGN KEY (item_id) REFERENCES items(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_review_history_item
            ON review_history(item_id, reviewed_at);

        CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![to_timestamp(Utc::now()).to_string()],
    )?;

    Ok(())
}

/// Retrieves the store's current (possibly simulated) date
pub fn get_current_date(conn: &Connection) -> Result<DateTime<Utc>> {
    let timestamp: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;

    timestamp
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or(AppError::InvalidTimestamp(timestamp))
}

pub fn set_current_date(date: DateTime<Utc>, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![to_timestamp(date).to_string()],
    )?;
    Ok(())
}

/// Advances current date by 24 hours (for simulating review schedules)
pub fn advance_day(conn: &Connection) -> Result<DateTime<Utc>> {
    let next_day = get_current_date(conn)? + Duration::days(1);
    set_current_date(next_day, conn)?;
    tracing::debug!(date = %next_day, "advanced simulated date");
    Ok(next_day)
}

/// Creates a new deck in the database
pub fn new_deck(name: &str, conn: &Connection) -> Result<()> {
    conn.execute("INSERT INTO decks (name) VALUES (?1)", params![name])?;
    tracing::info!(deck = name, "deck created");
    Ok(())
}

/// Retrieves all deck names from database
pub fn get_all_decks(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM decks ORDER BY name")?;
    let decks = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(decks)
}

/// Adds a new, never reviewed item to a deck.
///
/// Returns the item ID. If the item already exists (same deck + term), the
/// existing ID is returned unchanged.
pub fn add_item(deck_name: &str, term: &str, definition: &str, conn: &Connection) -> Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO items (deck_name, term, definition) VALUES (?1, ?2, ?3)",
        params![deck_name, term, definition],
    )?;

    let item_id: i64 = conn.query_row(
        "SELECT id FROM items WHERE deck_name = ?1 AND term = ?2",
        params![deck_name, term],
        |row| row.get(0),
    )?;

    Ok(item_id)
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<LearningItem> {
    Ok(LearningItem {
        id: row.get(0)?,
        term: row.get(1)?,
        definition: row.get(2)?,
        last_reviewed_date: timestamp_column(row, 3)?,
        next_review_date: timestamp_column(row, 4)?,
        recall_score: score_column(row, 5)?,
        perfect_recall_count: row.get(6)?,
        history: Vec::new(),
    })
}

/// Review history of an item, newest first.
///
/// Entries sharing a timestamp keep insertion order, latest insert first.
pub fn get_history(item_id: i64, conn: &Connection) -> Result<Vec<ReviewHistoryEntry>> {
    let mut stmt = conn.prepare(
        "SELECT reviewed_at, recall_score, retention_score
         FROM review_history
         WHERE item_id = ?1
         ORDER BY reviewed_at DESC, id DESC",
    )?;

    let history = stmt
        .query_map(params![item_id], |row| {
            Ok(ReviewHistoryEntry::new(
                required_timestamp_column(row, 0)?,
                score_column(row, 1)?,
                score_column(row, 2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(history)
}

/// Loads one item with its full history
pub fn load_item(item_id: i64, conn: &Connection) -> Result<LearningItem> {
    let mut item = conn
        .query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"),
            params![item_id],
            item_from_row,
        )
        .optional()?
        .ok_or(AppError::NotFound(item_id))?;

    item.history = get_history(item_id, conn)?;
    Ok(item)
}

fn load_items(sql: &str, deck_name: &str, now: Option<i64>, conn: &Connection) -> Result<Vec<LearningItem>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = match now {
        Some(now) => stmt.query_map(params![deck_name, now], item_from_row)?,
        None => stmt.query_map(params![deck_name], item_from_row)?,
    };
    let mut items = rows.collect::<rusqlite::Result<Vec<_>>>()?;

    for item in &mut items {
        item.history = get_history(item.id, conn)?;
    }
    Ok(items)
}

/// Retrieves all items of a deck with their history
pub fn get_items_for_deck(deck_name: &str, conn: &Connection) -> Result<Vec<LearningItem>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE deck_name = ?1 ORDER BY id");
    load_items(&sql, deck_name, None, conn)
}

/// Retrieves items due for review in a deck
///
/// Returns items never reviewed or whose next review date is not after the
/// current date, most overdue first and new items last.
pub fn get_items_due_for_review(deck_name: &str, conn: &Connection) -> Result<Vec<LearningItem>> {
    let now = to_timestamp(get_current_date(conn)?);
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM items
         WHERE deck_name = ?1 AND (next_review_at IS NULL OR next_review_at <= ?2)
         ORDER BY next_review_at IS NULL, next_review_at ASC, id ASC"
    );
    load_items(&sql, deck_name, Some(now), conn)
}

fn insert_history_entry(item_id: i64, entry: &ReviewHistoryEntry, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO review_history (item_id, reviewed_at, recall_score, retention_score)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            item_id,
            to_timestamp(entry.date),
            entry.recall_score,
            entry.retention_score
        ],
    )?;
    Ok(())
}

fn update_item_schedule(item: &LearningItem, conn: &Connection) -> Result<()> {
    conn.execute(
        "UPDATE items
         SET last_reviewed_at = ?1, next_review_at = ?2, recall_score = ?3, perfect_recall_count = ?4
         WHERE id = ?5",
        params![
            item.last_reviewed_date.map(to_timestamp),
            item.next_review_date.map(to_timestamp),
            item.recall_score,
            item.perfect_recall_count,
            item.id
        ],
    )?;
    Ok(())
}

/// Records a completed review of an item at the store's current date.
///
/// Reading the history, appending the new entry and storing the new schedule
/// happen in one immediate transaction, so concurrent reviews of the same
/// item are serialized by SQLite's write lock.
pub fn record_review(item_id: i64, recall_score: i32, conn: &mut Connection) -> Result<ReviewOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let now = get_current_date(&tx)?;
    let mut item = load_item(item_id, &tx)?;
    let outcome = item.record_review(recall_score, now);

    insert_history_entry(item_id, &outcome.entry, &tx)?;
    update_item_schedule(&item, &tx)?;
    tx.commit()?;

    tracing::debug!(
        item_id,
        recall_score = outcome.entry.recall_score,
        retention_score = outcome.entry.retention_score,
        perfect_recall_count = outcome.perfect_recall_count,
        next_review_date = %outcome.next_review_date,
        "review recorded"
    );
    if outcome.mastery_suggested {
        tracing::info!(item_id, term = %item.term, "item eligible for archiving");
    }

    Ok(outcome)
}

/// Archives an item, deleting it and (by cascade) its review history
pub fn archive_item(item_id: i64, conn: &Connection) -> Result<()> {
    let deleted = conn.execute("DELETE FROM items WHERE id = ?1", params![item_id])?;
    if deleted == 0 {
        return Err(AppError::NotFound(item_id));
    }
    tracing::info!(item_id, "item archived");
    Ok(())
}

/// Stores an imported deck with all of its items and their history.
///
/// Item IDs from the deck are ignored; the store assigns new ones. Items whose
/// term already exists in the deck are skipped, so existing history is never
/// touched. Returns the number of items stored.
pub fn save_deck(deck: &Deck, conn: &mut Connection) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("INSERT OR IGNORE INTO decks (name) VALUES (?1)", params![deck.name])?;

    let mut saved = 0;
    for item in &deck.items {
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO items (deck_name, term, definition) VALUES (?1, ?2, ?3)",
            params![deck.name, item.term, item.definition],
        )?;
        if inserted == 0 {
            tracing::warn!(deck = %deck.name, term = %item.term, "item already exists, skipped");
            continue;
        }

        let mut stored = item.clone();
        stored.id = tx.last_insert_rowid();
        stored.history.sort_by(|a, b| b.date.cmp(&a.date));
        stored.perfect_recall_count = compute_high_score_streak(&stored.history);
        update_item_schedule(&stored, &tx)?;
        // oldest first so insertion order matches review order
        for entry in stored.history.iter().rev() {
            insert_history_entry(stored.id, entry, &tx)?;
        }
        saved += 1;
    }

    tx.commit()?;
    tracing::info!(deck = %deck.name, items = saved, "deck saved");
    Ok(saved)
}

/// Loads all decks with their items and review history into memory
pub fn load_all_decks(conn: &Connection) -> Result<DeckSet> {
    let mut decks = Vec::new();

    for deck_name in get_all_decks(conn)? {
        let items = get_items_for_deck(&deck_name, conn)?;
        decks.push(Deck {
            name: deck_name,
            items,
        });
    }

    Ok(DeckSet { decks })
}
