//! Application State
//!
//! Shared state across all handlers. Nothing here is per call: every call's
//! progress travels in its webhook URLs.

use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use std::sync::Arc;

use call_agent_config::Settings;
use call_agent_core::TelephonyGateway;
use call_agent_flow::CallFlow;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Settings>>,
    pub flow: Arc<CallFlow>,
    pub gateway: Arc<dyn TelephonyGateway>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Settings, flow: CallFlow, gateway: Arc<dyn TelephonyGateway>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            flow: Arc::new(flow),
            gateway,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    /// Get a read guard to the current configuration
    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }

    /// Absolute URL the telephony platform fetches when the callee answers
    pub fn entry_webhook_url(&self) -> String {
        let config = self.get_config();
        format!(
            "{}{}",
            config.server.public_url.trim_end_matches('/'),
            config.telephony.entry_path
        )
    }
}
