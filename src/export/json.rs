//! JSON import/export module for decks.
//! Saves and loads Deck structures, including each item's review history, to/from JSON files.

use crate::error::Result;
use crate::models::Deck;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Exports a deck to a JSON file at the specified path.
pub fn export_json_to_path(deck: &Deck, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(deck)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    tracing::info!(deck = %deck.name, path = %path.display(), "deck exported");
    Ok(())
}

/// Imports a deck from a JSON file.
///
/// History is re-sorted newest-first since hand-edited files may not keep the order.
pub fn import_json(path: &Path) -> Result<Deck> {
    let file = File::open(path)?;
    let mut deck: Deck = serde_json::from_reader(BufReader::new(file))?;

    for item in &mut deck.items {
        item.history.sort_by(|a, b| b.date.cmp(&a.date));
    }

    tracing::info!(deck = %deck.name, path = %path.display(), "deck imported");
    Ok(deck)
}
