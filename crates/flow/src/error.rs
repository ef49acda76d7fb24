//! Flow errors
//!
//! Recognition, translation and persistence problems are absorbed inside the
//! steps (retry prompts, annotated fallbacks, logged sink failures), so only
//! failures that end the turn are represented here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Answer generation failed: {0}")]
    UpstreamAnswerFailure(String),

    #[error("Invalid flow context: {0}")]
    InvalidContext(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<call_agent_core::Error> for FlowError {
    fn from(err: call_agent_core::Error) -> Self {
        use call_agent_core::Error;
        match err {
            Error::Llm(msg) => FlowError::UpstreamAnswerFailure(msg),
            Error::Timeout(what) => FlowError::UpstreamAnswerFailure(format!("{} timed out", what)),
            Error::InvalidInput(msg) => FlowError::InvalidContext(msg),
            other => FlowError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: FlowError = call_agent_core::Error::Llm("quota".to_string()).into();
        assert!(matches!(err, FlowError::UpstreamAnswerFailure(_)));

        let err: FlowError = call_agent_core::Error::InvalidInput("attempt".to_string()).into();
        assert!(matches!(err, FlowError::InvalidContext(_)));

        let err: FlowError = call_agent_core::Error::Config("missing".to_string()).into();
        assert!(matches!(err, FlowError::Internal(_)));
    }
}
