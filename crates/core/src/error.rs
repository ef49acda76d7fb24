//! Error types shared across crates

use thiserror::Error;

/// Result alias using the core [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by collaborators of the call flow
#[derive(Error, Debug)]
pub enum Error {
    /// Speech recognition produced no usable text
    #[error("No speech recognized")]
    RecognitionEmpty,

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Telephony error: {0}")]
    Telephony(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error came from an upstream service call that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Llm(_) | Error::Translation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Telephony("401 Unauthorized".to_string());
        assert_eq!(err.to_string(), "Telephony error: 401 Unauthorized");
        assert_eq!(Error::RecognitionEmpty.to_string(), "No speech recognized");
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::Timeout("llm".into()).is_transient());
        assert!(!Error::Persistence("disk full".into()).is_transient());
    }
}
