//! LLM Factory
//!
//! Builds the backend named by `llm.provider` and wraps it in the answer
//! engine selected by `flow.variant`.

use std::sync::Arc;

use call_agent_config::{FlowVariant, LlmProvider, LlmSettings, Settings};
use call_agent_core::AnswerEngine;

use crate::answer::{GeneralAnswerEngine, KnowledgeBase, KnowledgeBaseAnswerEngine};
use crate::backend::{LlmBackend, LlmConfig, OllamaBackend};
use crate::gemini::GeminiBackend;
use crate::LlmError;

/// Create the configured backend
pub fn create_backend(settings: &LlmSettings) -> Result<Arc<dyn LlmBackend>, LlmError> {
    let config = LlmConfig::from(settings);
    let backend: Arc<dyn LlmBackend> = match settings.provider {
        LlmProvider::Gemini => Arc::new(GeminiBackend::new(config)?),
        LlmProvider::Ollama => Arc::new(OllamaBackend::new(config)?),
    };

    tracing::info!(
        provider = ?settings.provider,
        model = backend.model_name(),
        "Created LLM backend"
    );
    Ok(backend)
}

/// Create the answer engine for the configured flow variant
pub async fn create_answer_engine(settings: &Settings) -> Result<Arc<dyn AnswerEngine>, LlmError> {
    let backend = create_backend(&settings.llm)?;

    let engine: Arc<dyn AnswerEngine> = match settings.flow.variant {
        FlowVariant::General => Arc::new(GeneralAnswerEngine::new(backend)),
        FlowVariant::KnowledgeBase => {
            let knowledge = KnowledgeBase::load(&settings.knowledge_base.path).await;
            Arc::new(KnowledgeBaseAnswerEngine::new(
                backend,
                knowledge,
                settings.organization.clone(),
            ))
        }
    };

    Ok(engine)
}
