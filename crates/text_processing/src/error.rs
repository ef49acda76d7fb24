//! Text processing errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TextProcessingError>;

#[derive(Error, Debug)]
pub enum TextProcessingError {
    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for TextProcessingError {
    fn from(err: reqwest::Error) -> Self {
        TextProcessingError::Network(err.to_string())
    }
}

impl From<TextProcessingError> for call_agent_core::Error {
    fn from(err: TextProcessingError) -> Self {
        match err {
            TextProcessingError::Configuration(msg) => call_agent_core::Error::Config(msg),
            other => call_agent_core::Error::Translation(other.to_string()),
        }
    }
}
