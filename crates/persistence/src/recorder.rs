//! Fan-out profile recorder
//!
//! Delivers each profile to every configured sink concurrently. A failing or
//! slow sink is logged and counted but never fails the call: the caller has
//! already given their details and the conversation must continue.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};

use call_agent_core::{ProfileSink, Result, UserProfile};

/// Outcome of delivering one profile to one sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    Recorded,
    Failed(String),
    TimedOut,
}

impl SinkOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recorded => "ok",
            Self::Failed(_) => "error",
            Self::TimedOut => "timeout",
        }
    }
}

/// Records a profile to all sinks
pub struct ProfileRecorder {
    sinks: Vec<Arc<dyn ProfileSink>>,
    timeout: Duration,
}

impl ProfileRecorder {
    pub fn new(sinks: Vec<Arc<dyn ProfileSink>>, timeout: Duration) -> Self {
        Self { sinks, timeout }
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Deliver to every sink and report each outcome, in sink order
    pub async fn record_all(&self, profile: &UserProfile) -> Vec<(String, SinkOutcome)> {
        let deliveries = self.sinks.iter().map(|sink| async move {
            let start = Instant::now();
            let outcome = match tokio::time::timeout(self.timeout, sink.record(profile)).await {
                Ok(Ok(())) => SinkOutcome::Recorded,
                Ok(Err(e)) => SinkOutcome::Failed(e.to_string()),
                Err(_) => SinkOutcome::TimedOut,
            };

            match &outcome {
                SinkOutcome::Recorded => {}
                SinkOutcome::Failed(error) => {
                    tracing::warn!(sink = sink.name(), error = %error, "Profile sink failed")
                }
                SinkOutcome::TimedOut => {
                    tracing::warn!(sink = sink.name(), timeout = ?self.timeout, "Profile sink timed out")
                }
            }

            metrics::counter!(
                "call_agent_records_total",
                "sink" => sink.name().to_string(),
                "result" => outcome.as_str()
            )
            .increment(1);
            metrics::histogram!(
                "call_agent_upstream_latency_seconds",
                "kind" => format!("sink_{}", sink.name())
            )
            .record(start.elapsed().as_secs_f64());

            (sink.name().to_string(), outcome)
        });

        join_all(deliveries).await
    }
}

#[async_trait]
impl ProfileSink for ProfileRecorder {
    async fn record(&self, profile: &UserProfile) -> Result<()> {
        let outcomes = self.record_all(profile).await;
        let recorded = outcomes
            .iter()
            .filter(|(_, o)| *o == SinkOutcome::Recorded)
            .count();
        tracing::info!(
            name = %profile.name,
            blood_group = %profile.blood_group,
            recorded,
            sinks = outcomes.len(),
            "Profile recorded"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "recorder"
    }
}
