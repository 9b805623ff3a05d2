//! Prometheus metrics
//!
//! Counters and histograms are recorded through the `metrics` facade by the
//! agent and tools crates; this module installs the exporter and serves
//! `/metrics`.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

/// Vendor search latency buckets, in seconds
const SEARCH_BUCKETS: &[f64] = &[0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Install the global Prometheus recorder
///
/// Can only succeed once per process.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("event_planner_vendor_search_seconds".to_string()),
            SEARCH_BUCKETS,
        )?
        .install_recorder()?;

    metrics::describe_counter!("event_planner_turns_total", "Conversation turns processed");
    metrics::describe_counter!(
        "event_planner_slots_filled_total",
        "Slots filled by extraction, by slot"
    );
    metrics::describe_counter!("event_planner_plans_total", "Plans generated, by event type");
    metrics::describe_counter!(
        "event_planner_vendor_search_total",
        "Vendor searches, by outcome"
    );
    metrics::describe_histogram!(
        "event_planner_vendor_search_seconds",
        metrics::Unit::Seconds,
        "Vendor search latency"
    );

    Ok(handle)
}

/// Prometheus text exposition
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics {
        Some(ref handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "Metrics are disabled".to_string()),
    }
}
