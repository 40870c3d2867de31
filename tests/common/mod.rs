//! Shared test helpers for integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use xword_drill::db::{ClueStore, Database, InMemoryStore, NewClue, NewPuzzle};
use xword_drill::web::{build_router, AppState};

/// Returns the test database URL from the `TEST_DATABASE_URL` environment variable.
/// Panics if the variable is not set.
pub fn test_db_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set for integration tests")
}

/// Returns true if the test database URL is configured.
pub fn has_test_db() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

/// Connect to the test database, apply the schema, and empty every table.
pub async fn setup_test_db() -> Database {
    let db = Database::connect(&test_db_url())
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("schema migration failed");
    sqlx::raw_sql("TRUNCATE TABLE clues, entries, puzzles RESTART IDENTITY CASCADE")
        .execute(db.pool())
        .await
        .unwrap();
    db
}

/// Ids of the clues inserted by [`seed`].
#[derive(Debug, Clone, Copy)]
pub struct Seeded {
    /// "Cookie with a creme center" → OREO, text appears once.
    pub unique: i64,
    /// "Sea eagle" → ERNE; the same text also maps to ERNE once more and to ERN.
    pub shared: i64,
    /// "Sea eagle" → ERN.
    pub shared_other_entry: i64,
    pub puzzle_id: i64,
}

/// Populate any store with a small, known set of clues.
pub async fn seed(store: &dyn ClueStore) -> Seeded {
    let puzzle = store
        .insert_puzzle(&NewPuzzle {
            title: Some("Tuesday Themeless".into()),
            date: NaiveDate::from_ymd_opt(2024, 2, 13).unwrap(),
            byline: "Pat Setter".into(),
            publisher: "nyt".into(),
        })
        .await
        .unwrap();
    let oreo = store.upsert_entry("oreo").await.unwrap();
    let erne = store.upsert_entry("Erne").await.unwrap();
    let ern = store.upsert_entry("ern").await.unwrap();

    let unique = insert_clue(store, "Cookie with a creme center", oreo.id, puzzle.id).await;
    let shared = insert_clue(store, "Sea eagle", erne.id, puzzle.id).await;
    insert_clue(store, "Sea eagle", erne.id, puzzle.id).await;
    let shared_other_entry = insert_clue(store, "Sea eagle", ern.id, puzzle.id).await;

    Seeded {
        unique,
        shared,
        shared_other_entry,
        puzzle_id: puzzle.id,
    }
}

pub async fn insert_clue(store: &dyn ClueStore, text: &str, entry_id: i64, puzzle_id: i64) -> i64 {
    store
        .insert_clue(&NewClue {
            clue_text: text.to_string(),
            entry_id,
            puzzle_id,
            theme: false,
        })
        .await
        .unwrap()
        .id
}

/// Build a router over a seeded in-memory store.
pub async fn build_test_app() -> (axum::Router, Seeded) {
    let (app, _, seeded) = build_test_app_with_state().await;
    (app, seeded)
}

/// Like [`build_test_app`], also returning the shared state for inspection.
pub async fn build_test_app_with_state() -> (axum::Router, Arc<AppState>, Seeded) {
    let store = Arc::new(InMemoryStore::new());
    let seeded = seed(store.as_ref()).await;
    let state = AppState::new(store, Duration::from_secs(3600));
    (build_router(state.clone()), state, seeded)
}

/// Build a router over an empty in-memory store.
pub fn build_empty_app() -> axum::Router {
    let state = AppState::new(Arc::new(InMemoryStore::new()), Duration::from_secs(3600));
    build_router(state)
}
