//! # Database — Puzzle, Entry and Clue Storage
//!
//! Provides async storage for crossword puzzles, their answer entries and the
//! clues that link them. Two backends implement [`ClueStore`]:
//!
//! - [`Database`]: PostgreSQL via `sqlx::PgPool`.
//! - [`InMemoryStore`]: process-local tables behind a mutex, for tests and demos.
//!
//! ## Schema
//!
//! - `puzzles`: title, date, byline, publisher
//! - `entries`: unique uppercase `entry_text`
//! - `clues`: clue_text, entry_id → entries, puzzle_id → puzzles, theme
//!
//! Deleting a puzzle or an entry cascades to its clues.
//!
//! ## Module Structure
//!
//! - [`clues`] — random pick, lookup by id, similar-clue aggregation
//! - [`catalog`] — puzzle/entry/clue writes and deletes
//! - [`in_memory`] — the mutex-backed store

mod catalog;
mod clues;
mod in_memory;

pub use in_memory::InMemoryStore;

use crate::error::DrillError;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::fmt;

pub const PUZZLE_TITLE_MAX: usize = 255;
pub const PUZZLE_BYLINE_MAX: usize = 255;
pub const PUZZLE_PUBLISHER_MAX: usize = 12;
pub const ENTRY_TEXT_MAX: usize = 50;
pub const CLUE_TEXT_MAX: usize = 512;

const SCHEMA_SQL: &str = include_str!("../../migrations/001_xword.sql");

// ── Record types ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Puzzle {
    pub id: i64,
    pub title: Option<String>,
    pub date: NaiveDate,
    pub byline: String,
    pub publisher: String,
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {}",
            self.title.as_deref().unwrap_or(""),
            self.date,
            self.publisher
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Entry {
    pub id: i64,
    pub entry_text: String,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entry_text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Clue {
    pub id: i64,
    pub clue_text: String,
    pub entry_id: i64,
    pub puzzle_id: i64,
    pub theme: bool,
}

/// A clue joined with its entry text and puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClueDetail {
    pub id: i64,
    pub clue_text: String,
    pub theme: bool,
    pub entry_text: String,
    pub puzzle: Puzzle,
}

/// Flat row shape of the clue/entry/puzzle join.
#[derive(sqlx::FromRow)]
pub(crate) struct ClueDetailRow {
    pub id: i64,
    pub clue_text: String,
    pub theme: bool,
    pub entry_text: String,
    pub puzzle_id: i64,
    pub puzzle_title: Option<String>,
    pub puzzle_date: NaiveDate,
    pub puzzle_byline: String,
    pub puzzle_publisher: String,
}

impl From<ClueDetailRow> for ClueDetail {
    fn from(r: ClueDetailRow) -> Self {
        ClueDetail {
            id: r.id,
            clue_text: r.clue_text,
            theme: r.theme,
            entry_text: r.entry_text,
            puzzle: Puzzle {
                id: r.puzzle_id,
                title: r.puzzle_title,
                date: r.puzzle_date,
                byline: r.puzzle_byline,
                publisher: r.puzzle_publisher,
            },
        }
    }
}

/// Number of clues with a given clue text that point at one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct EntryCount {
    pub entry_text: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub puzzles: i64,
    pub entries: i64,
    pub clues: i64,
}

// ── Write payloads ──────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct NewPuzzle {
    #[serde(default)]
    pub title: Option<String>,
    pub date: NaiveDate,
    pub byline: String,
    pub publisher: String,
}

impl NewPuzzle {
    pub fn validate(&self) -> Result<(), DrillError> {
        if let Some(title) = &self.title {
            check_len("title", title, PUZZLE_TITLE_MAX)?;
        }
        check_len("byline", &self.byline, PUZZLE_BYLINE_MAX)?;
        check_len("publisher", &self.publisher, PUZZLE_PUBLISHER_MAX)?;
        Ok(())
    }

    /// Title as stored: an empty title is kept as no title.
    pub(crate) fn stored_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewClue {
    pub clue_text: String,
    pub entry_id: i64,
    pub puzzle_id: i64,
    #[serde(default)]
    pub theme: bool,
}

impl NewClue {
    pub fn validate(&self) -> Result<(), DrillError> {
        if self.clue_text.trim().is_empty() {
            return Err(DrillError::blank("clue_text"));
        }
        check_len("clue_text", &self.clue_text, CLUE_TEXT_MAX)
    }
}

/// Normalize entry text for storage and validate it.
///
/// Entries are identified by their uppercase text, so `"Oreo"` and `"OREO"`
/// are the same entry.
pub fn normalize_entry_text(text: &str) -> Result<String, DrillError> {
    let normalized = text.to_uppercase();
    if normalized.trim().is_empty() {
        return Err(DrillError::blank("entry_text"));
    }
    check_len("entry_text", &normalized, ENTRY_TEXT_MAX)?;
    Ok(normalized)
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), DrillError> {
    if value.chars().count() > max {
        return Err(DrillError::too_long(field, max));
    }
    Ok(())
}

// ── Store trait ─────────────────────────────────────────────────

/// Storage operations needed by the drill and answer flows, plus the writes
/// loaders use to populate the tables.
#[async_trait]
pub trait ClueStore: Send + Sync {
    /// One clue chosen uniformly at random, or `None` if there are no clues.
    async fn random_clue(&self) -> Result<Option<ClueDetail>>;

    async fn get_clue(&self, id: i64) -> Result<Option<ClueDetail>>;

    /// Clues whose text exactly equals `clue_text`, grouped by entry text and
    /// ordered by descending count, then entry text.
    async fn similar_clue_counts(&self, clue_text: &str) -> Result<Vec<EntryCount>>;

    async fn insert_puzzle(&self, puzzle: &NewPuzzle) -> Result<Puzzle>;

    /// Insert an entry, or return the existing one with the same normalized text.
    async fn upsert_entry(&self, entry_text: &str) -> Result<Entry>;

    async fn insert_clue(&self, clue: &NewClue) -> Result<Clue>;

    /// Delete a puzzle and its clues. Returns false if it did not exist.
    async fn delete_puzzle(&self, id: i64) -> Result<bool>;

    /// Delete an entry and its clues. Returns false if it did not exist.
    async fn delete_entry(&self, id: i64) -> Result<bool>;

    async fn counts(&self) -> Result<StoreCounts>;

    async fn health_check(&self) -> Result<()>;
}

// ── Database struct and connection ──────────────────────────────

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL using the provided database URL.
    ///
    /// The URL is parsed manually so percent-encoded credentials are decoded
    /// before being handed to the driver.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let url = url::Url::parse(database_url)?;
        let username = urlencoding::decode(url.username())?.into_owned();
        let password = url
            .password()
            .map(|p| urlencoding::decode(p).map(|s| s.into_owned()))
            .transpose()?;
        let mut opts = PgConnectOptions::new()
            .host(url.host_str().unwrap_or("localhost"))
            .port(url.port().unwrap_or(5432))
            .database(url.path().trim_start_matches('/'))
            .username(&username);
        if let Some(ref pw) = password {
            opts = opts.password(pw);
        }
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;
        Ok(Database { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables and indexes if they do not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Health check: execute `SELECT 1` to verify database connectivity.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ClueStore for Database {
    async fn random_clue(&self) -> Result<Option<ClueDetail>> {
        Database::random_clue(self).await
    }

    async fn get_clue(&self, id: i64) -> Result<Option<ClueDetail>> {
        Database::get_clue(self, id).await
    }

    async fn similar_clue_counts(&self, clue_text: &str) -> Result<Vec<EntryCount>> {
        Database::similar_clue_counts(self, clue_text).await
    }

    async fn insert_puzzle(&self, puzzle: &NewPuzzle) -> Result<Puzzle> {
        Database::insert_puzzle(self, puzzle).await
    }

    async fn upsert_entry(&self, entry_text: &str) -> Result<Entry> {
        Database::upsert_entry(self, entry_text).await
    }

    async fn insert_clue(&self, clue: &NewClue) -> Result<Clue> {
        Database::insert_clue(self, clue).await
    }

    async fn delete_puzzle(&self, id: i64) -> Result<bool> {
        Database::delete_puzzle(self, id).await
    }

    async fn delete_entry(&self, id: i64) -> Result<bool> {
        Database::delete_entry(self, id).await
    }

    async fn counts(&self) -> Result<StoreCounts> {
        Database::counts(self).await
    }

    async fn health_check(&self) -> Result<()> {
        Database::health_check(self).await
    }
}

// ── Tests ───────────────────────────────────────────────────────
