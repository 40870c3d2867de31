//! Answer endpoints: the clue's entry, how often its text recurs, and the
//! visitor's running tally.

use super::errors::{ApiError, PageError};
use super::{pages, AppState};
use crate::drill::{self, AnswerReport};
use crate::session::SessionId;
use axum::extract::{Extension, Path, State};
use axum::response::Html;
use axum::Json;
use std::sync::Arc;

/// `GET /answer/{id}/`
///
/// The id is taken as a string so a non-numeric id is a 404 like any other
/// unknown clue.
pub(super) async fn handler_answer_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let clue_id = drill::parse_clue_id(&id)?;
    let report =
        drill::answer_report(state.store.as_ref(), &state.sessions, session, clue_id).await?;
    Ok(Html(pages::answer_page(&report)))
}

/// `GET /api/answer/{id}`
pub(super) async fn handler_api_answer(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Path(id): Path<String>,
) -> Result<Json<AnswerReport>, ApiError> {
    let clue_id = drill::parse_clue_id(&id)?;
    let report =
        drill::answer_report(state.store.as_ref(), &state.sessions, session, clue_id).await?;
    Ok(Json(report))
}
