//! Database integration tests for the PostgreSQL clue store.
//!
//! All tests require TEST_DATABASE_URL to be set.
//! Run with: TEST_DATABASE_URL=postgres://... cargo test --test db_integration
//!
//! Tests should be run single-threaded to avoid conflicts:
//!   cargo test --test db_integration -- --test-threads=1

mod common;

use std::sync::Arc;
use std::time::Duration;
use xword_drill::db::{ClueStore, Database, NewClue, NewPuzzle};
use xword_drill::drill;
use xword_drill::session::SessionStore;

/// Skip the test if TEST_DATABASE_URL is not set.
macro_rules! require_db {
    () => {
        if !common::has_test_db() {
            eprintln!("Skipping: TEST_DATABASE_URL not set");
            return;
        }
    };
}

async fn setup() -> Database {
    common::setup_test_db().await
}

#[tokio::test]
async fn migrate_is_idempotent() {
    require_db!();
    let db = setup().await;
    db.migrate().await.unwrap();
    db.migrate().await.unwrap();
    assert_eq!(db.counts().await.unwrap().clues, 0);
}

#[tokio::test]
async fn upsert_entry_stores_uppercase_and_dedupes() {
    require_db!();
    let db = setup().await;
    let a = db.upsert_entry("a la mode").await.unwrap();
    let b = db.upsert_entry("A La Mode").await.unwrap();
    assert_eq!(a.entry_text, "A LA MODE");
    assert_eq!(a.id, b.id);
    assert_eq!(db.counts().await.unwrap().entries, 1);
}

#[tokio::test]
async fn upsert_entry_rejects_overlong_text() {
    require_db!();
    let db = setup().await;
    let err = db.upsert_entry(&"q".repeat(51)).await.unwrap_err();
    assert!(err.to_string().contains("entry_text"));
}

#[tokio::test]
async fn insert_puzzle_keeps_missing_title_as_none() {
    require_db!();
    let db = setup().await;
    let p = db
        .insert_puzzle(&NewPuzzle {
            title: None,
            date: chrono::NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            byline: "Someone".into(),
            publisher: "up".into(),
        })
        .await
        .unwrap();
    assert_eq!(p.title, None);
    assert_eq!(p.to_string(), " (2020-06-01) - up");
}

#[tokio::test]
async fn get_clue_joins_entry_and_puzzle() {
    require_db!();
    let db = setup().await;
    let seeded = common::seed(&db).await;
    let clue = db.get_clue(seeded.unique).await.unwrap().unwrap();
    assert_eq!(clue.clue_text, "Cookie with a creme center");
    assert_eq!(clue.entry_text, "OREO");
    assert_eq!(clue.puzzle.title.as_deref(), Some("Tuesday Themeless"));
    assert!(db.get_clue(seeded.unique + 1000).await.unwrap().is_none());
}

#[tokio::test]
async fn random_clue_returns_stored_clue_or_none() {
    require_db!();
    let db = setup().await;
    assert!(db.random_clue().await.unwrap().is_none());
    let seeded = common::seed(&db).await;
    let clue = db.random_clue().await.unwrap().unwrap();
    assert!(clue.id >= seeded.unique && clue.id <= seeded.shared_other_entry);
}

#[tokio::test]
async fn similar_clue_counts_groups_by_entry() {
    require_db!();
    let db = setup().await;
    common::seed(&db).await;
    let counts = db.similar_clue_counts("Sea eagle").await.unwrap();
    let flat: Vec<(&str, i64)> = counts
        .iter()
        .map(|c| (c.entry_text.as_str(), c.count))
        .collect();
    assert_eq!(flat, vec![("ERNE", 2), ("ERN", 1)]);
    assert!(db.similar_clue_counts("sea eagle").await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_puzzle_cascades_to_clues() {
    require_db!();
    let db = setup().await;
    let seeded = common::seed(&db).await;
    assert!(db.delete_puzzle(seeded.puzzle_id).await.unwrap());
    let counts = db.counts().await.unwrap();
    assert_eq!((counts.puzzles, counts.clues), (0, 0));
    assert_eq!(counts.entries, 3);
    assert!(!db.delete_puzzle(seeded.puzzle_id).await.unwrap());
}

#[tokio::test]
async fn deleting_entry_cascades_to_clues() {
    require_db!();
    let db = setup().await;
    let seeded = common::seed(&db).await;
    let oreo = db.get_clue(seeded.unique).await.unwrap().unwrap();
    let entry = db.upsert_entry(&oreo.entry_text).await.unwrap();
    assert!(db.delete_entry(entry.id).await.unwrap());
    assert!(db.get_clue(seeded.unique).await.unwrap().is_none());
    assert!(db.get_clue(seeded.shared).await.unwrap().is_some());
}

#[tokio::test]
async fn insert_clue_with_missing_entry_fails() {
    require_db!();
    let db = setup().await;
    let seeded = common::seed(&db).await;
    let err = db
        .insert_clue(&NewClue {
            clue_text: "Orphan".into(),
            entry_id: 987_654,
            puzzle_id: seeded.puzzle_id,
            theme: true,
        })
        .await;
    assert!(err.is_err());
}

#[tokio::test]
async fn drill_flow_against_postgres() {
    require_db!();
    let db = setup().await;
    let seeded = common::seed(&db).await;
    let store: Arc<dyn ClueStore> = Arc::new(db);
    let sessions = SessionStore::new(Duration::from_secs(60));
    let (session, _) = sessions.resolve(None);

    drill::display_drill(store.as_ref(), &sessions, session)
        .await
        .unwrap();
    drill::submit_answer(store.as_ref(), &sessions, session, seeded.unique, " oreo ")
        .await
        .unwrap();
    let report = drill::answer_report(store.as_ref(), &sessions, session, seeded.unique)
        .await
        .unwrap();
    assert!(report.is_unique);
    assert_eq!((report.correct_answers, report.total_drills), (1, 1));
}
