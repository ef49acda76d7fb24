//! Translation trait

use async_trait::async_trait;

use crate::{Language, Result};

/// Translates recognized speech between languages
///
/// # Example
/// ```ignore
/// let english = translator.translate("राम", Language::Hindi, Language::English).await?;
/// // "Ram"
/// ```
#[async_trait]
pub trait Translator: Send + Sync + 'static {
    /// Translate `text` from `from` into `to`
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String>;

    /// Translator name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockTranslator;

    #[async_trait]
    impl Translator for MockTranslator {
        async fn translate(&self, text: &str, _from: Language, _to: Language) -> Result<String> {
            Ok(format!("[Translated: {}]", text))
        }

        fn name(&self) -> &str {
            "mock-translator"
        }
    }

    #[tokio::test]
    async fn test_mock_translator() {
        let translator = MockTranslator;
        let result = translator
            .translate("नमस्ते", Language::Hindi, Language::English)
            .await
            .unwrap();
        assert!(result.contains("Translated"));
        assert_eq!(translator.name(), "mock-translator");
    }
}
