//! Translation of recognized speech
//!
//! Caller input arrives in Hindi (often mixed with English words) and is
//! translated to English before it reaches the answer engine or a profile
//! sink. Translation is best-effort: [`translate_lenient`] never fails, it
//! falls back to the original text marked with [`TRANSLATION_FAILED_SUFFIX`].

mod google;
mod noop;

pub use google::GoogleTranslator;
pub use noop::NoopTranslator;

use std::sync::Arc;
use std::time::Duration;

use call_agent_config::{TranslationConfig, TranslationProvider};
use call_agent_core::{Language, Translator};

/// Appended to text that could not be translated
pub const TRANSLATION_FAILED_SUFFIX: &str = " (translation failed)";

/// Create translator based on config
pub fn create_translator(config: &TranslationConfig) -> Arc<dyn Translator> {
    match config.provider {
        TranslationProvider::Google => match GoogleTranslator::new(config) {
            Ok(translator) => {
                tracing::info!(endpoint = %config.endpoint, "Using Google web translation");
                Arc::new(translator)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create Google translator, using pass-through");
                Arc::new(NoopTranslator)
            }
        },
        TranslationProvider::Noop => {
            tracing::info!("Translation disabled (pass-through)");
            Arc::new(NoopTranslator)
        }
    }
}

/// Translate with a deadline, falling back to the annotated original
///
/// Empty input is returned as-is without calling the translator.
pub async fn translate_lenient(
    translator: &dyn Translator,
    text: &str,
    from: Language,
    to: Language,
    deadline: Duration,
) -> String {
    let text = text.trim();
    match try_translate(translator, text, from, to, deadline).await {
        Some(translated) => translated,
        None => format!("{}{}", text, TRANSLATION_FAILED_SUFFIX),
    }
}

/// Translate with a deadline; `None` when the translator fails or times out
///
/// Used where an annotated fallback would corrupt the value, e.g. addresses.
pub async fn try_translate(
    translator: &dyn Translator,
    text: &str,
    from: Language,
    to: Language,
    deadline: Duration,
) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return Some(String::new());
    }

    match tokio::time::timeout(deadline, translator.translate(text, from, to)).await {
        Ok(Ok(translated)) => {
            tracing::debug!(original = %text, translated = %translated, "Translated");
            Some(translated)
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, translator = translator.name(), "Translation failed");
            None
        }
        Err(_) => {
            tracing::warn!(
                timeout_ms = deadline.as_millis() as u64,
                translator = translator.name(),
                "Translation timed out"
            );
            None
        }
    }
}
