//! Prometheus metrics
//!
//! Counters and histograms are emitted through the `metrics` facade by the
//! flow, persistence and telephony crates; this module only installs the
//! recorder and serves the exposition text.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

/// Install the global Prometheus recorder
///
/// Returns `None` if a recorder is already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new()
        .set_buckets(&[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])
        .and_then(|builder| builder.install_recorder())
    {
        Ok(handle) => {
            describe_metrics();
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

fn describe_metrics() {
    metrics::describe_counter!("call_agent_steps_total", "Webhook steps handled, by step and outcome");
    metrics::describe_counter!("call_agent_records_total", "Profile writes, by sink and result");
    metrics::describe_counter!("call_agent_calls_placed_total", "Outbound call attempts, by result");
    metrics::describe_histogram!(
        "call_agent_upstream_latency_seconds",
        "Latency of translation and answer requests"
    );
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "Metrics are disabled".to_string()),
    }
}
