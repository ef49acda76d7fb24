use async_trait::async_trait;
use call_agent_core::{Language, Result, Translator};

/// Pass-through translator
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(&self, text: &str, _from: Language, _to: Language) -> Result<String> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
