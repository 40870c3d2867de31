//! Clue reads: random pick, lookup by id, and similar-clue aggregation.

use super::{ClueDetail, ClueDetailRow, Database, EntryCount};
use anyhow::Result;

const CLUE_DETAIL_SELECT: &str = "SELECT c.id, c.clue_text, c.theme, e.entry_text,
            p.id AS puzzle_id, NULLIF(p.title, '') AS puzzle_title, p.date AS puzzle_date,
            p.byline AS puzzle_byline, p.publisher AS puzzle_publisher
     FROM clues c
     JOIN entries e ON e.id = c.entry_id
     JOIN puzzles p ON p.id = c.puzzle_id";

impl Database {
    /// Pick one clue uniformly at random.
    pub async fn random_clue(&self) -> Result<Option<ClueDetail>> {
        let sql = format!("{} ORDER BY random() LIMIT 1", CLUE_DETAIL_SELECT);
        let row = sqlx::query_as::<_, ClueDetailRow>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ClueDetail::from))
    }

    pub async fn get_clue(&self, id: i64) -> Result<Option<ClueDetail>> {
        let sql = format!("{} WHERE c.id = $1", CLUE_DETAIL_SELECT);
        let row = sqlx::query_as::<_, ClueDetailRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ClueDetail::from))
    }

    /// Group clues sharing `clue_text` by entry and count each group.
    pub async fn similar_clue_counts(&self, clue_text: &str) -> Result<Vec<EntryCount>> {
        let rows = sqlx::query_as::<_, EntryCount>(
            "SELECT e.entry_text, COUNT(c.id) AS count
             FROM clues c
             JOIN entries e ON e.id = c.entry_id
             WHERE c.clue_text = $1
             GROUP BY e.entry_text
             ORDER BY count DESC, e.entry_text ASC",
        )
        .bind(clue_text)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
