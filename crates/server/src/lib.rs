//! Call Agent Server
//!
//! Hosts the telephony webhooks, the call trigger and health endpoints.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::init_metrics;
pub use state::AppState;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Call placement failed: {0}")]
    Placement(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<call_agent_core::Error> for ServerError {
    fn from(err: call_agent_core::Error) -> Self {
        match err {
            call_agent_core::Error::Config(msg) => ServerError::Config(msg),
            call_agent_core::Error::InvalidInput(msg) => ServerError::InvalidRequest(msg),
            other => ServerError::Placement(other.to_string()),
        }
    }
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Placement(_) => axum::http::StatusCode::BAD_GATEWAY,
            ServerError::Config(_) => axum::http::StatusCode::SERVICE_UNAVAILABLE,
            ServerError::InvalidRequest(_) => axum::http::StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
