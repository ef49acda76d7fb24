//! Question answering
//!
//! Two [`AnswerEngine`] implementations share one backend: an open-domain
//! engine and one that restricts answers to a plain-text knowledge base
//! loaded once at startup.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use call_agent_core::{AnswerEngine, Result};

use crate::backend::LlmBackend;
use crate::prompt::PromptBuilder;
use crate::LlmError;

/// Placeholder used when the knowledge file cannot be read
pub const KNOWLEDGE_BASE_MISSING: &str = "Knowledge base not found or could not be loaded.";

/// Plain-text knowledge base
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    content: String,
    loaded: bool,
}

impl KnowledgeBase {
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            loaded: true,
        }
    }

    /// Read the knowledge file. A missing or unreadable file is not fatal:
    /// the placeholder text is used and the model will decline to answer.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                tracing::info!(path = %path.display(), bytes = content.len(), "Loaded knowledge base");
                Self::from_text(content)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Knowledge base unavailable, using placeholder");
                Self {
                    content: KNOWLEDGE_BASE_MISSING.to_string(),
                    loaded: false,
                }
            }
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

async fn generate_answer(
    backend: &dyn LlmBackend,
    messages: &[crate::prompt::Message],
) -> std::result::Result<String, LlmError> {
    let result = backend.generate(messages).await?;
    if result.text.trim().is_empty() {
        return Err(LlmError::InvalidResponse("empty answer".to_string()));
    }
    tracing::debug!(
        model = backend.model_name(),
        tokens = result.tokens,
        total_time_ms = result.total_time_ms,
        "Answer generated"
    );
    Ok(result.text)
}

/// Open-domain answers
pub struct GeneralAnswerEngine {
    backend: Arc<dyn LlmBackend>,
    prompts: PromptBuilder,
}

impl GeneralAnswerEngine {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend,
            prompts: PromptBuilder::default(),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }
}

#[async_trait]
impl AnswerEngine for GeneralAnswerEngine {
    async fn answer(&self, question: &str) -> Result<String> {
        let messages = self.prompts.general(question);
        Ok(generate_answer(self.backend.as_ref(), &messages).await?)
    }

    fn name(&self) -> &str {
        "general"
    }
}

/// Answers grounded in the organization's knowledge base
pub struct KnowledgeBaseAnswerEngine {
    backend: Arc<dyn LlmBackend>,
    knowledge: KnowledgeBase,
    organization: String,
    prompts: PromptBuilder,
}

impl KnowledgeBaseAnswerEngine {
    pub fn new(backend: Arc<dyn LlmBackend>, knowledge: KnowledgeBase, organization: impl Into<String>) -> Self {
        Self {
            backend,
            knowledge,
            organization: organization.into(),
            prompts: PromptBuilder::default(),
        }
    }
}

#[async_trait]
impl AnswerEngine for KnowledgeBaseAnswerEngine {
    async fn answer(&self, question: &str) -> Result<String> {
        let messages = self
            .prompts
            .knowledge_base(&self.organization, self.knowledge.content(), question);
        Ok(generate_answer(self.backend.as_ref(), &messages).await?)
    }

    fn name(&self) -> &str {
        "knowledge_base"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FinishReason, GenerationResult};
    use crate::prompt::Message;
    use parking_lot::Mutex;
    use std::io::Write;

    struct ScriptedBackend {
        reply: std::result::Result<String, String>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedBackend {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err("connection refused".to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn generate(&self, messages: &[Message]) -> std::result::Result<GenerationResult, LlmError> {
            self.seen.lock().push(messages.to_vec());
            match &self.reply {
                Ok(text) => Ok(GenerationResult {
                    text: text.clone(),
                    tokens: 4,
                    total_time_ms: 1,
                    finish_reason: FinishReason::Stop,
                }),
                Err(e) => Err(LlmError::Network(e.clone())),
            }
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_general_answer() {
        let backend = ScriptedBackend::replying("प्लाज्मा रक्त का तरल भाग है।");
        let engine = GeneralAnswerEngine::new(backend.clone());
        let answer = engine.answer("What is plasma?").await.unwrap();
        assert_eq!(answer, "प्लाज्मा रक्त का तरल भाग है।");
        assert_eq!(backend.seen.lock()[0][1].content, "Question: What is plasma?");
    }

    #[tokio::test]
    async fn test_backend_failure_is_llm_error() {
        let engine = GeneralAnswerEngine::new(ScriptedBackend::failing());
        let err = engine.answer("anything").await.unwrap_err();
        assert!(matches!(err, call_agent_core::Error::Llm(_)));
    }

    #[tokio::test]
    async fn test_empty_answer_is_error() {
        let engine = GeneralAnswerEngine::new(ScriptedBackend::replying("   "));
        assert!(engine.answer("anything").await.is_err());
    }

    #[tokio::test]
    async fn test_knowledge_base_prompt_carries_content() {
        let backend = ScriptedBackend::replying("हर रविवार।");
        let engine = KnowledgeBaseAnswerEngine::new(
            backend.clone(),
            KnowledgeBase::from_text("Donation camps run every Sunday."),
            "Prerit Foundation",
        );
        engine.answer("When are camps held?").await.unwrap();
        let seen = backend.seen.lock();
        assert!(seen[0][0].content.contains("Donation camps run every Sunday."));
        assert!(seen[0][0].content.contains("Prerit Foundation"));
        assert_eq!(engine.name(), "knowledge_base");
    }

    #[tokio::test]
    async fn test_load_knowledge_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Blood can be donated every three months.").unwrap();
        let kb = KnowledgeBase::load(file.path()).await;
        assert!(kb.is_loaded());
        assert!(kb.content().contains("three months"));
    }

    #[tokio::test]
    async fn test_missing_knowledge_file_uses_placeholder() {
        let kb = KnowledgeBase::load("/nonexistent/knowledge.txt").await;
        assert!(!kb.is_loaded());
        assert_eq!(kb.content(), KNOWLEDGE_BASE_MISSING);
    }
}
