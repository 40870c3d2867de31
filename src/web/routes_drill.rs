//! Drill endpoints: show a random clue, check a submitted answer.
//!
//! | Endpoint | Success | Wrong answer |
//! |----------|---------|--------------|
//! | `GET /drill/` | HTML clue + form | — |
//! | `POST /drill/` | `303` → `/answer/{id}/` | same clue, with error |
//! | `GET /api/drill` | `{clue_id, clue_text}` | — |
//! | `POST /api/drill` | `{correct: true, clue_id, answer_url}` | `422 {correct: false, error, clue}` |
//!
//! A `clue_id` that is not an integer is a 404, in the form and in JSON alike.

use super::errors::{ApiError, PageError};
use super::{pages, AppState};
use crate::drill::{self, DrillPrompt};
use crate::error::DrillError;
use crate::prom_metrics::ResultLabel;
use crate::session::SessionId;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Extension, Form, State};
use axum::response::{Html, Redirect};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub(super) struct DrillForm {
    #[serde(default)]
    clue_id: String,
    #[serde(default)]
    answer: String,
}

#[derive(Deserialize)]
pub(super) struct DrillSubmission {
    #[serde(default)]
    clue_id: serde_json::Value,
    #[serde(default)]
    answer: String,
}

impl DrillSubmission {
    /// Accepts `7` or `"7"`; anything else is an unknown clue.
    fn clue_id(&self) -> Result<i64, DrillError> {
        match &self.clue_id {
            serde_json::Value::String(raw) => drill::parse_clue_id(raw),
            other => drill::parse_clue_id(&other.to_string()),
        }
    }
}

#[derive(Serialize)]
pub(super) struct DrillAccepted {
    correct: bool,
    clue_id: i64,
    answer_url: String,
}

fn answer_url(clue_id: i64) -> String {
    format!("/answer/{}/", clue_id)
}

async fn display(state: &AppState, session: SessionId) -> Result<DrillPrompt, DrillError> {
    let prompt = drill::display_drill(state.store.as_ref(), &state.sessions, session).await?;
    state.prom_metrics.drills_served.inc();
    Ok(prompt)
}

async fn submit(
    state: &AppState,
    session: SessionId,
    clue_id: i64,
    answer: &str,
) -> Result<i64, DrillError> {
    let result =
        drill::submit_answer(state.store.as_ref(), &state.sessions, session, clue_id, answer)
            .await;
    let checked = match &result {
        Ok(_) => Some(true),
        Err(DrillError::IncorrectAnswer { .. }) => Some(false),
        Err(_) => None,
    };
    if let Some(correct) = checked {
        state
            .prom_metrics
            .answers_checked
            .get_or_create(&ResultLabel::correct(correct))
            .inc();
    }
    result
}

/// `GET /drill/` — random clue with an answer form.
pub(super) async fn handler_drill_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
) -> Result<Html<String>, PageError> {
    let prompt = display(&state, session).await?;
    Ok(Html(pages::drill_page(&prompt, None)))
}

/// `POST /drill/` — form submission; redirects to the answer page when correct.
pub(super) async fn handler_drill_submit(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    form: Result<Form<DrillForm>, FormRejection>,
) -> Result<Redirect, PageError> {
    let Form(form) = form?;
    let clue_id = drill::parse_clue_id(&form.clue_id)?;
    let clue_id = submit(&state, session, clue_id, &form.answer).await?;
    Ok(Redirect::to(&answer_url(clue_id)))
}

/// `GET /api/drill` — random clue as JSON.
pub(super) async fn handler_api_drill(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<DrillPrompt>, ApiError> {
    Ok(Json(display(&state, session).await?))
}

/// `POST /api/drill` — JSON answer submission.
pub(super) async fn handler_api_drill_submit(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    payload: Result<Json<DrillSubmission>, JsonRejection>,
) -> Result<Json<DrillAccepted>, ApiError> {
    let Json(payload) = payload?;
    let clue_id = submit(&state, session, payload.clue_id()?, &payload.answer).await?;
    Ok(Json(DrillAccepted {
        correct: true,
        clue_id,
        answer_url: answer_url(clue_id),
    }))
}
