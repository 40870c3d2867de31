//! Domain errors for the drill and answer flows.
//!
//! Only two kinds ever reach the user: a clue that cannot be found, and input
//! that fails validation (a wrong answer, or an over-long field on write).
//! Everything else is an infrastructure failure carried as `Store`.

use crate::drill::DrillPrompt;

/// Coarse classification used by the web layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum DrillError {
    #[error("clue {0} not found")]
    ClueNotFound(i64),

    #[error("no clue with id {0:?}")]
    MalformedClueId(String),

    #[error("no clues are available")]
    NoClues,

    /// The submitted answer did not match; `clue` is re-displayed.
    #[error("{message}")]
    IncorrectAnswer { clue: DrillPrompt, message: String },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl DrillError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DrillError::ClueNotFound(_)
            | DrillError::MalformedClueId(_)
            | DrillError::NoClues => ErrorKind::NotFound,
            DrillError::IncorrectAnswer { .. } | DrillError::InvalidField { .. } => {
                ErrorKind::Validation
            }
            DrillError::Store(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn too_long(field: &'static str, max: usize) -> Self {
        DrillError::InvalidField {
            field,
            reason: format!("must be at most {} characters", max),
        }
    }

    pub(crate) fn blank(field: &'static str) -> Self {
        DrillError::InvalidField {
            field,
            reason: "must not be blank".to_string(),
        }
    }
}
