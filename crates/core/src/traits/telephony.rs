//! Telephony gateway trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Outbound call request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    /// Number to dial (E.164)
    pub to: String,
    /// Caller ID (E.164)
    pub from: String,
    /// Absolute URL the platform fetches when the call is answered
    pub webhook_url: String,
}

/// A call accepted by the telephony platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedCall {
    /// Platform-assigned call identifier
    pub sid: String,
    /// Initial status reported by the platform (e.g. `queued`)
    pub status: String,
}

/// Places outbound calls
#[async_trait]
pub trait TelephonyGateway: Send + Sync + 'static {
    async fn place_call(&self, request: &CallRequest) -> Result<PlacedCall>;
}
