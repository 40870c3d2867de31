//! # Web — Drill Server
//!
//! Runs an Axum HTTP server with the drill and answer pages, a JSON API over
//! the same operations, and Kubernetes-style health endpoints.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /` | redirect to `/drill/` |
//! | `GET, POST /drill/` | [`routes_drill`] HTML page and form post |
//! | `GET /answer/{id}/` | [`routes_answer`] HTML page |
//! | `GET, POST /api/drill` | JSON drill |
//! | `GET /api/answer/{id}` | JSON answer report |
//! | `GET /healthz`, `/readyz`, `/metrics` | [`routes_health`] |
//!
//! The drill and answer routes pass through the session middleware, which
//! resolves the `xword_session` cookie to a
//! [`SessionId`](crate::session::SessionId) in the request extensions. Health,
//! metrics and unmatched paths never touch sessions.

mod errors;
mod middleware_session;
mod pages;
mod routes_answer;
mod routes_drill;
mod routes_health;

use crate::db::{self, ClueStore};
use crate::prom_metrics;
use crate::session::SessionStore;
use anyhow::Result;
use axum::extract::{MatchedPath, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Instrument};

const SESSION_PRUNE_INTERVAL: Duration = Duration::from_secs(60);
const UNMATCHED_ROUTE: &str = "unmatched";

pub struct AppState {
    pub store: Arc<dyn ClueStore>,
    pub sessions: SessionStore,
    pub prom_metrics: prom_metrics::Metrics,
}

impl AppState {
    pub fn new(store: Arc<dyn ClueStore>, session_ttl: Duration) -> Arc<Self> {
        Arc::new(AppState {
            store,
            sessions: SessionStore::new(session_ttl),
            prom_metrics: prom_metrics::Metrics::new(),
        })
    }

    pub fn with_db(db: db::Database, session_ttl: Duration) -> Arc<Self> {
        Self::new(Arc::new(db), session_ttl)
    }

    /// Drop idle sessions and refresh the active-session gauge.
    pub fn prune_sessions(&self) -> usize {
        let removed = self.sessions.prune_expired();
        self.prom_metrics
            .sessions_active
            .set(self.sessions.len() as i64);
        removed
    }
}

/// Server settings gathered from the command line.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub session_ttl: Duration,
}

/// Records request latency, propagates or generates an `x-request-id`, and
/// runs the request inside a tracing span.
async fn metrics_middleware(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> axum::response::Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let method = req.method().to_string();
    let raw_path = req.uri().path().to_string();
    let route = route_label(&req);
    let start = std::time::Instant::now();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %raw_path,
    );
    let mut response = next.run(req).instrument(span).await;

    state
        .prom_metrics
        .http_request_duration
        .get_or_create(&prom_metrics::HttpLabel {
            method,
            path: route,
        })
        .observe(start.elapsed().as_secs_f64());

    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

/// Histogram label for a request: the route template it matched, so clue ids
/// and junk paths don't create new label sets.
fn route_label(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/drill/") }))
        .route(
            "/drill/",
            get(routes_drill::handler_drill_page).post(routes_drill::handler_drill_submit),
        )
        .route("/answer/{id}/", get(routes_answer::handler_answer_page))
        .route(
            "/api/drill",
            get(routes_drill::handler_api_drill).post(routes_drill::handler_api_drill_submit),
        )
        .route("/api/answer/{id}", get(routes_answer::handler_api_answer))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware_session::session_middleware,
        ))
        .route("/healthz", get(routes_health::handler_healthz))
        .route("/readyz", get(routes_health::handler_readyz))
        .route("/metrics", get(routes_health::handler_metrics))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CatchPanicLayer::new())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .with_state(state)
}

/// Serve until SIGINT/SIGTERM, pruning idle sessions in the background.
pub async fn run(store: Arc<dyn ClueStore>, config: &ServeConfig) -> Result<()> {
    let state = AppState::new(store, config.session_ttl);
    let app = build_router(state.clone());

    let prune_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = prune_state.prune_sessions();
            if removed > 0 {
                info!(count = removed, "pruned idle sessions");
            }
        }
    });

    let addr = SocketAddr::new(config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "drill server running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("drill server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("received SIGINT, shutting down"),
                    _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                ctrl_c.await.ok();
                info!("received SIGINT, shutting down");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("received SIGINT, shutting down");
    }
}
