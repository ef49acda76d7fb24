//! LLM integration for caller questions
//!
//! Features:
//! - Backend support (Gemini, Ollama) with retry and exponential backoff
//! - Prompt building for open-domain and knowledge-base answers
//! - [`AnswerEngine`](call_agent_core::AnswerEngine) implementations used by the call flow

pub mod answer;
pub mod backend;
pub mod factory;
pub mod gemini;
pub mod prompt;

pub use answer::{GeneralAnswerEngine, KnowledgeBase, KnowledgeBaseAnswerEngine};
pub use backend::{FinishReason, GenerationResult, LlmBackend, LlmConfig, OllamaBackend};
pub use factory::{create_answer_engine, create_backend};
pub use gemini::GeminiBackend;
pub use prompt::{Message, PromptBuilder, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    /// The model declined to answer (safety filter or empty candidate list)
    #[error("Blocked: {0}")]
    Blocked(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for call_agent_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout => call_agent_core::Error::Timeout("llm".to_string()),
            LlmError::Configuration(msg) => call_agent_core::Error::Config(msg),
            other => call_agent_core::Error::Llm(other.to_string()),
        }
    }
}
