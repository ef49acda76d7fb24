//! Profile persistence for the call agent
//!
//! Provides the sinks a caller profile is written to:
//! - Local CSV log
//! - Google Sheets row append
//! - ScyllaDB `users` table (plus the per-step `conversations` log)
//! - Thank-you email
//!
//! [`init`] builds the enabled sinks from configuration and wraps them in a
//! [`ProfileRecorder`], which never fails a call because of a sink.

pub mod client;
pub mod csv;
pub mod email;
pub mod error;
pub mod recorder;
pub mod schema;
pub mod scylla_store;
pub mod sheets;

pub use client::{ScyllaClient, ScyllaConfig};
pub use csv::CsvProfileSink;
pub use email::EmailNotifier;
pub use error::PersistenceError;
pub use recorder::{ProfileRecorder, SinkOutcome};
pub use scylla_store::ScyllaProfileStore;
pub use sheets::SheetsProfileSink;

use std::sync::Arc;
use std::time::Duration;

use call_agent_config::Settings;
use call_agent_core::{ConversationLogger, ProfileSink};

/// Initialize the persistence layer from settings
///
/// Sinks that are enabled but misconfigured or unreachable are skipped with a
/// warning so the call flow still starts.
pub async fn init(settings: &Settings) -> PersistenceLayer {
    let config = &settings.persistence;
    let timeout = Duration::from_secs(config.record_timeout_secs);
    let mut sinks: Vec<Arc<dyn ProfileSink>> = Vec::new();
    let mut conversation_log: Option<Arc<dyn ConversationLogger>> = None;

    if config.csv.enabled {
        sinks.push(Arc::new(CsvProfileSink::new(&config.csv.path)));
    }

    if config.sheets.enabled {
        match SheetsProfileSink::new(&config.sheets, timeout) {
            Ok(sink) => sinks.push(Arc::new(sink)),
            Err(e) => tracing::warn!(error = %e, "Google Sheets sink disabled"),
        }
    }

    if config.scylla.enabled {
        match connect_scylla(ScyllaConfig::from(&config.scylla)).await {
            Ok(store) => {
                let store = Arc::new(store);
                sinks.push(store.clone());
                conversation_log = Some(store);
            }
            Err(e) => tracing::warn!(error = %e, "ScyllaDB sink disabled"),
        }
    }

    if config.email.enabled {
        match EmailNotifier::new(config.email.clone(), settings.organization.clone()) {
            Ok(notifier) => sinks.push(Arc::new(notifier)),
            Err(e) => tracing::warn!(error = %e, "Email notifier disabled"),
        }
    }

    let recorder = ProfileRecorder::new(sinks, timeout);
    tracing::info!(sinks = ?recorder.sink_names(), "Persistence initialized");

    PersistenceLayer {
        recorder: Arc::new(recorder),
        conversation_log,
    }
}

async fn connect_scylla(config: ScyllaConfig) -> Result<ScyllaProfileStore, PersistenceError> {
    let client = ScyllaClient::connect(config).await?;
    client.ensure_schema().await?;
    Ok(ScyllaProfileStore::new(client))
}

/// Combined persistence layer
pub struct PersistenceLayer {
    pub recorder: Arc<ProfileRecorder>,
    /// Present only when ScyllaDB is enabled and reachable
    pub conversation_log: Option<Arc<dyn ConversationLogger>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_with_defaults_uses_csv_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.persistence.csv.path = dir.path().join("users.csv").display().to_string();

        let layer = init(&settings).await;
        assert_eq!(layer.recorder.sink_names(), vec!["csv"]);
        assert!(layer.conversation_log.is_none());
    }

    #[tokio::test]
    async fn test_misconfigured_sinks_are_skipped() {
        let mut settings = Settings::default();
        settings.persistence.csv.enabled = false;
        settings.persistence.sheets.enabled = true;
        settings.persistence.email.enabled = true;

        let layer = init(&settings).await;
        assert!(layer.recorder.sink_names().is_empty());
    }
}
