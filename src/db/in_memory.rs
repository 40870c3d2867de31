//! Process-local [`ClueStore`] backed by vectors behind a mutex.
//!
//! Mirrors the PostgreSQL semantics closely enough for the web layer to be
//! exercised without a database: ids are assigned sequentially from 1, entry
//! text is unique after normalization, and deletes cascade to clues.

use super::{
    normalize_entry_text, Clue, ClueDetail, ClueStore, Entry, EntryCount, NewClue, NewPuzzle,
    Puzzle, StoreCounts,
};
use crate::lock_or_recover;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct Tables {
    puzzles: Vec<Puzzle>,
    entries: Vec<Entry>,
    clues: Vec<Clue>,
    next_puzzle_id: i64,
    next_entry_id: i64,
    next_clue_id: i64,
}

impl Tables {
    fn detail(&self, clue: &Clue) -> Option<ClueDetail> {
        let entry = self.entries.iter().find(|e| e.id == clue.entry_id)?;
        let puzzle = self.puzzles.iter().find(|p| p.id == clue.puzzle_id)?;
        Some(ClueDetail {
            id: clue.id,
            clue_text: clue.clue_text.clone(),
            theme: clue.theme,
            entry_text: entry.entry_text.clone(),
            puzzle: puzzle.clone(),
        })
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClueStore for InMemoryStore {
    async fn random_clue(&self) -> Result<Option<ClueDetail>> {
        let tables = lock_or_recover(&self.tables);
        let picked = tables.clues.choose(&mut rand::thread_rng());
        Ok(picked.and_then(|c| tables.detail(c)))
    }

    async fn get_clue(&self, id: i64) -> Result<Option<ClueDetail>> {
        let tables = lock_or_recover(&self.tables);
        Ok(tables
            .clues
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| tables.detail(c)))
    }

    async fn similar_clue_counts(&self, clue_text: &str) -> Result<Vec<EntryCount>> {
        let tables = lock_or_recover(&self.tables);
        let mut groups: BTreeMap<&str, i64> = BTreeMap::new();
        for clue in tables.clues.iter().filter(|c| c.clue_text == clue_text) {
            if let Some(entry) = tables.entries.iter().find(|e| e.id == clue.entry_id) {
                *groups.entry(entry.entry_text.as_str()).or_insert(0) += 1;
            }
        }
        // BTreeMap yields entry text ascending; a stable sort keeps that as the tie-break.
        let mut counts: Vec<EntryCount> = groups
            .into_iter()
            .map(|(entry_text, count)| EntryCount {
                entry_text: entry_text.to_string(),
                count,
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(counts)
    }

    async fn insert_puzzle(&self, puzzle: &NewPuzzle) -> Result<Puzzle> {
        puzzle.validate()?;
        let mut tables = lock_or_recover(&self.tables);
        tables.next_puzzle_id += 1;
        let row = Puzzle {
            id: tables.next_puzzle_id,
            title: puzzle.stored_title().map(str::to_string),
            date: puzzle.date,
            byline: puzzle.byline.clone(),
            publisher: puzzle.publisher.clone(),
        };
        tables.puzzles.push(row.clone());
        Ok(row)
    }

    async fn upsert_entry(&self, entry_text: &str) -> Result<Entry> {
        let text = normalize_entry_text(entry_text)?;
        let mut tables = lock_or_recover(&self.tables);
        if let Some(existing) = tables.entries.iter().find(|e| e.entry_text == text) {
            return Ok(existing.clone());
        }
        tables.next_entry_id += 1;
        let row = Entry {
            id: tables.next_entry_id,
            entry_text: text,
        };
        tables.entries.push(row.clone());
        Ok(row)
    }

    async fn insert_clue(&self, clue: &NewClue) -> Result<Clue> {
        clue.validate()?;
        let mut tables = lock_or_recover(&self.tables);
        if !tables.entries.iter().any(|e| e.id == clue.entry_id) {
            return Err(anyhow!("entry {} does not exist", clue.entry_id));
        }
        if !tables.puzzles.iter().any(|p| p.id == clue.puzzle_id) {
            return Err(anyhow!("puzzle {} does not exist", clue.puzzle_id));
        }
        tables.next_clue_id += 1;
        let row = Clue {
            id: tables.next_clue_id,
            clue_text: clue.clue_text.clone(),
            entry_id: clue.entry_id,
            puzzle_id: clue.puzzle_id,
            theme: clue.theme,
        };
        tables.clues.push(row.clone());
        Ok(row)
    }

    async fn delete_puzzle(&self, id: i64) -> Result<bool> {
        let mut tables = lock_or_recover(&self.tables);
        let before = tables.puzzles.len();
        tables.puzzles.retain(|p| p.id != id);
        if tables.puzzles.len() == before {
            return Ok(false);
        }
        tables.clues.retain(|c| c.puzzle_id != id);
        Ok(true)
    }

    async fn delete_entry(&self, id: i64) -> Result<bool> {
        let mut tables = lock_or_recover(&self.tables);
        let before = tables.entries.len();
        tables.entries.retain(|e| e.id != id);
        if tables.entries.len() == before {
            return Ok(false);
        }
        tables.clues.retain(|c| c.entry_id != id);
        Ok(true)
    }

    async fn counts(&self) -> Result<StoreCounts> {
        let tables = lock_or_recover(&self.tables);
        Ok(StoreCounts {
            puzzles: tables.puzzles.len() as i64,
            entries: tables.entries.len() as i64,
            clues: tables.clues.len() as i64,
        })
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
