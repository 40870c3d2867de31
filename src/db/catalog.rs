//! Puzzle, entry and clue writes.
//!
//! The drill server never calls these; they exist for loaders and tests.
//! Entry text is normalized to uppercase before it reaches the table, and
//! the `ON DELETE CASCADE` foreign keys take care of dependent clues.

use super::{normalize_entry_text, Clue, Database, Entry, NewClue, NewPuzzle, Puzzle, StoreCounts};
use anyhow::Result;

impl Database {
    pub async fn insert_puzzle(&self, puzzle: &NewPuzzle) -> Result<Puzzle> {
        puzzle.validate()?;
        let row = sqlx::query_as::<_, Puzzle>(
            "INSERT INTO puzzles (title, date, byline, publisher)
             VALUES (COALESCE($1, ''), $2, $3, $4)
             RETURNING id, NULLIF(title, '') AS title, date, byline, publisher",
        )
        .bind(puzzle.stored_title())
        .bind(puzzle.date)
        .bind(&puzzle.byline)
        .bind(&puzzle.publisher)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Insert an entry by its normalized text, returning the existing row on conflict.
    pub async fn upsert_entry(&self, entry_text: &str) -> Result<Entry> {
        let text = normalize_entry_text(entry_text)?;
        let row = sqlx::query_as::<_, Entry>(
            "INSERT INTO entries (entry_text) VALUES ($1)
             ON CONFLICT (entry_text) DO UPDATE SET entry_text = EXCLUDED.entry_text
             RETURNING id, entry_text",
        )
        .bind(&text)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_clue(&self, clue: &NewClue) -> Result<Clue> {
        clue.validate()?;
        let row = sqlx::query_as::<_, Clue>(
            "INSERT INTO clues (clue_text, entry_id, puzzle_id, theme)
             VALUES ($1, $2, $3, $4)
             RETURNING id, clue_text, entry_id, puzzle_id, theme",
        )
        .bind(&clue.clue_text)
        .bind(clue.entry_id)
        .bind(clue.puzzle_id)
        .bind(clue.theme)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete_puzzle(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM puzzles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_entry(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn counts(&self) -> Result<StoreCounts> {
        let (puzzles, entries, clues): (i64, i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM puzzles),
                    (SELECT COUNT(*) FROM entries),
                    (SELECT COUNT(*) FROM clues)",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(StoreCounts {
            puzzles,
            entries,
            clues,
        })
    }
}
