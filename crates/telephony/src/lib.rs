//! Telephony for the call agent
//!
//! - [`twiml`]: builder for the voice responses returned from webhooks
//! - [`twilio`]: REST client that places the outbound call

pub mod twilio;
pub mod twiml;

pub use twilio::TwilioGateway;
pub use twiml::{Gather, HttpMethod, Say, Verb, VoiceResponse, TWIML_CONTENT_TYPE};

use thiserror::Error;

/// Telephony errors
#[derive(Error, Debug)]
pub enum TelephonyError {
    #[error("Twilio API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for TelephonyError {
    fn from(err: reqwest::Error) -> Self {
        TelephonyError::Network(err.to_string())
    }
}

impl From<TelephonyError> for call_agent_core::Error {
    fn from(err: TelephonyError) -> Self {
        match err {
            TelephonyError::Configuration(msg) => call_agent_core::Error::Config(msg),
            other => call_agent_core::Error::Telephony(other.to_string()),
        }
    }
}
