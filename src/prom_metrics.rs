//! # Prometheus Metrics
//!
//! Exposes drill-server counters in the OpenMetrics text format on `/metrics`.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `xword_drills_served_total` | Counter | — | Random clues displayed |
//! | `xword_answers_checked_total` | Counter | `result` | Submitted answers, `correct` or `incorrect` |
//! | `xword_sessions_active` | Gauge | — | Sessions currently held in memory |
//! | `xword_http_request_duration_seconds` | Histogram | `method`, `path` | Request latency |

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, prometheus_client::encoding::EncodeLabelSet)]
pub struct ResultLabel {
    pub result: String,
}

impl ResultLabel {
    pub fn correct(correct: bool) -> Self {
        ResultLabel {
            result: if correct { "correct" } else { "incorrect" }.to_string(),
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, prometheus_client::encoding::EncodeLabelSet)]
pub struct HttpLabel {
    pub method: String,
    pub path: String,
}

fn latency_histogram() -> Histogram {
    Histogram::new(exponential_buckets(0.001, 2.0, 14))
}

/// Registry plus handles to every metric; all handles are cheap clones of atomics.
pub struct Metrics {
    pub registry: Registry,
    pub drills_served: Counter,
    pub answers_checked: Family<ResultLabel, Counter>,
    pub sessions_active: Gauge,
    pub http_request_duration: Family<HttpLabel, Histogram, fn() -> Histogram>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let drills_served = Counter::default();
        registry.register(
            "xword_drills_served",
            "Random clues displayed",
            drills_served.clone(),
        );

        let answers_checked = Family::<ResultLabel, Counter>::default();
        registry.register(
            "xword_answers_checked",
            "Submitted answers by result",
            answers_checked.clone(),
        );

        let sessions_active = Gauge::default();
        registry.register(
            "xword_sessions_active",
            "Sessions currently held in memory",
            sessions_active.clone(),
        );

        let http_request_duration =
            Family::<HttpLabel, Histogram, fn() -> Histogram>::new_with_constructor(
                latency_histogram,
            );
        registry.register(
            "xword_http_request_duration_seconds",
            "HTTP request latency in seconds",
            http_request_duration.clone(),
        );

        Self {
            registry,
            drills_served,
            answers_checked,
            sessions_active,
            http_request_duration,
        }
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut buf = String::new();
        if let Err(e) = encode(&mut buf, &self.registry) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        buf
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
