//! Map [`DrillError`] onto HTTP responses, once for pages and once for the JSON API.
//!
//! Body extractor rejections (wrong content type, unparseable JSON) go through
//! the same types so clients always get an HTML page or a `{"error": ...}` body.

use super::pages;
use crate::error::{DrillError, ErrorKind};
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tracing::warn;

fn status_for(err: &DrillError) -> StatusCode {
    match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Public message for an error; store failures are logged, not echoed.
fn public_message(err: &DrillError) -> String {
    match err {
        DrillError::Store(e) => {
            warn!(error = %e, "store failure");
            "internal error".to_string()
        }
        other => other.to_string(),
    }
}

/// Error rendered as an HTML page.
pub(super) enum PageError {
    Drill(DrillError),
    Form(FormRejection),
}

impl From<DrillError> for PageError {
    fn from(e: DrillError) -> Self {
        PageError::Drill(e)
    }
}

impl From<FormRejection> for PageError {
    fn from(e: FormRejection) -> Self {
        PageError::Form(e)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            // A wrong answer is not a failed request: show the clue again.
            PageError::Drill(DrillError::IncorrectAnswer { clue, message }) => {
                Html(pages::drill_page(&clue, Some(message.as_str()))).into_response()
            }
            PageError::Drill(err) => {
                let status = status_for(&err);
                let message = public_message(&err);
                (status, Html(pages::error_page(status, &message))).into_response()
            }
            PageError::Form(rejection) => {
                let status = rejection.status();
                (status, Html(pages::error_page(status, &rejection.body_text()))).into_response()
            }
        }
    }
}

/// Error rendered as `{"error": ...}` JSON.
pub(super) enum ApiError {
    Drill(DrillError),
    Json(JsonRejection),
}

impl From<DrillError> for ApiError {
    fn from(e: DrillError) -> Self {
        ApiError::Drill(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::Json(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Drill(DrillError::IncorrectAnswer { clue, message }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({
                    "correct": false,
                    "error": message,
                    "clue": clue,
                })),
            )
                .into_response(),
            ApiError::Drill(err) => {
                let status = status_for(&err);
                let message = public_message(&err);
                (status, Json(serde_json::json!({ "error": message }))).into_response()
            }
            ApiError::Json(rejection) => (
                rejection.status(),
                Json(serde_json::json!({ "error": rejection.body_text() })),
            )
                .into_response(),
        }
    }
}
