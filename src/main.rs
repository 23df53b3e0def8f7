use recall_engine::config::Config;
use recall_engine::database::db;
use recall_engine::*;

use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

const DEMO_DECK: &str = "Polish Vocabulary";

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let conn = db::open_database(&config.db_path)?;

    if db::get_all_decks(&conn)?.is_empty() {
        db::new_deck(DEMO_DECK, &conn)?;
        db::add_item(DEMO_DECK, "cześć", "hello", &conn)?;
        db::add_item(DEMO_DECK, "dziękuję", "thank you", &conn)?;
        db::add_item(DEMO_DECK, "proszę", "please", &conn)?;
        tracing::info!("sample data created");
    }

    let deck_set = db::load_all_decks(&conn)?;
    let today = db::get_current_date(&conn)?;
    tracing::info!(
        decks = deck_set.decks.len(),
        due = deck_set.total_due(today),
        "decks loaded"
    );

    // Simulated study run: recall improves a little on every pass.
    let conn = Arc::new(Mutex::new(conn));
    for (pass, recall_score) in [40, 70, 90, 95, 100].into_iter().enumerate() {
        let mut session = ReviewSession::new_from_due_items(DEMO_DECK.to_string(), Arc::clone(&conn))?;
        if session.total_count() > 0 {
            println!("Day {}: {}", pass + 1, session.phase_message());
        }

        while !session.is_completed() {
            let Some(term) = session.current_item().map(|item| item.term.clone()) else {
                break;
            };
            // a failed item is retried within the session at a passing score
            let score = if session.round_number > 1 { 60 } else { recall_score };
            if let Some(outcome) = session.grade_current_item(score)? {
                println!(
                    "  {:<10} recall {:>3} retention {:>3} next {}",
                    term,
                    outcome.entry.recall_score,
                    outcome.entry.retention_score,
                    outcome.next_review_date.format("%Y-%m-%d")
                );
            }
            session.next_item();
        }

        let guard = conn.lock().map_err(|_| AppError::LockPoisoned)?;
        db::advance_day(&guard)?;
    }

    let guard = conn.lock().map_err(|_| AppError::LockPoisoned)?;
    let deck_set = db::load_all_decks(&guard)?;
    if let Some(deck) = deck_set.find(DEMO_DECK) {
        for item in deck.mastery_candidates() {
            println!("'{}' has been mastered and can be archived", item.term);
        }
    }

    Ok(())
}
