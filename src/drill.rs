//! # Drill — Random Clues, Answer Checking, Answer Reports
//!
//! The three operations behind the web pages:
//!
//! - [`display_drill`]: pick a random clue and count one drill for the session.
//! - [`submit_answer`]: compare a free-text answer to the clue's entry and
//!   count a correct answer on match.
//! - [`answer_report`]: describe a clue, how often its text appears in the
//!   store and for which entries, and the session's running tally.
//!
//! Answers are compared after trimming and uppercasing, against the entry's
//! uppercase text, so `"  oreo "` answers `OREO`.

use crate::db::{ClueDetail, ClueStore, EntryCount};
use crate::error::DrillError;
use crate::session::{SessionId, SessionStore, SessionTally};
use serde::Serialize;
use tracing::debug;

pub const INCORRECT_ANSWER_MESSAGE: &str = "Your answer is not correct";

/// What the drill page shows: a clue and the id to post the answer against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrillPrompt {
    pub clue_id: i64,
    pub clue_text: String,
}

impl From<&ClueDetail> for DrillPrompt {
    fn from(clue: &ClueDetail) -> Self {
        DrillPrompt {
            clue_id: clue.id,
            clue_text: clue.clue_text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerReport {
    pub clue: ClueDetail,
    pub similar_clues: Vec<EntryCount>,
    pub is_unique: bool,
    pub correct_answers: u64,
    pub total_drills: u64,
    pub message: String,
}

pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_uppercase()
}

pub fn is_correct_answer(answer: &str, entry_text: &str) -> bool {
    normalize_answer(answer) == entry_text.to_uppercase()
}

/// A clue is unique when its text maps to a single entry exactly once.
pub fn is_unique(similar_clues: &[EntryCount]) -> bool {
    matches!(similar_clues, [only] if only.count == 1)
}

pub fn answer_message(entry_text: &str, tally: SessionTally) -> String {
    format!(
        "{} is the correct answer! You have now answered {} (of {}) clues correctly.",
        entry_text, tally.correct_answers, tally.total_drills
    )
}

/// Parse a clue id as it arrives from a form or path segment.
pub fn parse_clue_id(raw: &str) -> Result<i64, DrillError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| DrillError::MalformedClueId(raw.to_string()))
}

/// Pick a random clue and count one drill for `session`.
///
/// An empty store is reported as [`DrillError::NoClues`] and leaves the
/// counters alone.
pub async fn display_drill(
    store: &dyn ClueStore,
    sessions: &SessionStore,
    session: SessionId,
) -> Result<DrillPrompt, DrillError> {
    let clue = store.random_clue().await?.ok_or(DrillError::NoClues)?;
    let tally = sessions.record_drill(session);
    debug!(clue_id = clue.id, total_drills = tally.total_drills, "drill displayed");
    Ok(DrillPrompt::from(&clue))
}

/// Check `answer` against clue `clue_id`.
///
/// Returns the clue id on a correct answer (after counting it), or
/// [`DrillError::IncorrectAnswer`] carrying the clue to show again.
pub async fn submit_answer(
    store: &dyn ClueStore,
    sessions: &SessionStore,
    session: SessionId,
    clue_id: i64,
    answer: &str,
) -> Result<i64, DrillError> {
    let clue = store
        .get_clue(clue_id)
        .await?
        .ok_or(DrillError::ClueNotFound(clue_id))?;

    if !is_correct_answer(answer, &clue.entry_text) {
        debug!(clue_id, "incorrect answer");
        return Err(DrillError::IncorrectAnswer {
            clue: DrillPrompt::from(&clue),
            message: INCORRECT_ANSWER_MESSAGE.to_string(),
        });
    }

    let tally = sessions.record_correct(session);
    debug!(clue_id, correct_answers = tally.correct_answers, "correct answer");
    Ok(clue.id)
}

/// Build the answer page for `clue_id`. Reads the session tally, never writes it.
pub async fn answer_report(
    store: &dyn ClueStore,
    sessions: &SessionStore,
    session: SessionId,
    clue_id: i64,
) -> Result<AnswerReport, DrillError> {
    let clue = store
        .get_clue(clue_id)
        .await?
        .ok_or(DrillError::ClueNotFound(clue_id))?;
    let similar_clues = store.similar_clue_counts(&clue.clue_text).await?;
    let tally = sessions.tally(session);

    Ok(AnswerReport {
        is_unique: is_unique(&similar_clues),
        message: answer_message(&clue.entry_text, tally),
        correct_answers: tally.correct_answers,
        total_drills: tally.total_drills,
        similar_clues,
        clue,
    })
}
