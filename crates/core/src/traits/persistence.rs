//! Persistence traits

use async_trait::async_trait;

use crate::{ConversationLogEntry, Result, UserProfile};

/// Append-only destination for caller profiles
///
/// A sink never deduplicates or updates; each `record` call is one row.
#[async_trait]
pub trait ProfileSink: Send + Sync + 'static {
    async fn record(&self, profile: &UserProfile) -> Result<()>;

    /// Sink name for logging and metrics
    fn name(&self) -> &str;
}

/// Destination for per-step conversation logs
#[async_trait]
pub trait ConversationLogger: Send + Sync + 'static {
    async fn log_turn(&self, entry: &ConversationLogEntry) -> Result<()>;
}
