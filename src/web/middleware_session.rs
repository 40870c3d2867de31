//! Session cookie middleware.
//!
//! Reads `xword_session` from the `Cookie` header, resolves it against the
//! [`SessionStore`](crate::session::SessionStore), and stores the resulting
//! [`SessionId`] in the request extensions. A fresh id is only stored once a
//! handler writes a counter for it, and only then does the response carry a
//! `Set-Cookie`; read-only visits leave the session map untouched.

use super::AppState;
use crate::session::{session_cookie, session_id_from_cookie_header, SessionId};
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use tracing::debug;

pub(super) async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(session_id_from_cookie_header)
        .map(str::to_string);

    let (session, is_new) = state.sessions.resolve(presented.as_deref());
    req.extensions_mut().insert::<SessionId>(session);

    let mut response = next.run(req).await;
    if is_new && state.sessions.contains(session) {
        debug!(%session, "new session");
        state
            .prom_metrics
            .sessions_active
            .set(state.sessions.len() as i64);
        if let Ok(value) = session_cookie(session, state.sessions.ttl()).parse() {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}
