//! Google web translation client
//!
//! Uses the public `translate_a/single` endpoint, which auto-detects the
//! source language. The response is a nested JSON array whose first element
//! holds `[translated, original, ...]` segments, one per sentence.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use call_agent_config::TranslationConfig;
use call_agent_core::{Language, Result, Translator};

use crate::TextProcessingError;

/// Translator backed by Google's web translation endpoint
#[derive(Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslationConfig) -> std::result::Result<Self, TextProcessingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                TextProcessingError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn request(&self, text: &str, to: Language) -> std::result::Result<String, TextProcessingError> {
        let response = self
            .client
            .get(format!("{}/translate_a/single", self.endpoint))
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", to.code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TextProcessingError::Translation(format!("HTTP {}: {}", status, body)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TextProcessingError::InvalidResponse(e.to_string()))?;

        parse_segments(&body)
    }
}

/// Concatenate the translated text of every segment
fn parse_segments(body: &Value) -> std::result::Result<String, TextProcessingError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TextProcessingError::InvalidResponse("missing segments".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(TextProcessingError::InvalidResponse(
            "empty translation".to_string(),
        ));
    }

    Ok(translated.trim().to_string())
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String> {
        if from == to {
            return Ok(text.to_string());
        }
        Ok(self.request(text, to).await?)
    }

    fn name(&self) -> &str {
        "google-web"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn translator_for(server: &MockServer) -> GoogleTranslator {
        GoogleTranslator::new(&TranslationConfig {
            endpoint: server.uri(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_parse_multi_sentence_response() {
        let body = json!([
            [["My name is Ram. ", "मेरा नाम राम है।", null, null, 10],
             ["I am fine.", "मैं ठीक हूँ।", null, null, 10]],
            null,
            "hi"
        ]);
        assert_eq!(
            parse_segments(&body).unwrap(),
            "My name is Ram. I am fine."
        );
    }

    #[test]
    fn test_parse_rejects_unexpected_shape() {
        assert!(parse_segments(&json!({"error": "quota"})).is_err());
        assert!(parse_segments(&json!([[]])).is_err());
    }

    #[tokio::test]
    async fn test_translate_hindi_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("tl", "en"))
            .and(query_param("q", "राम"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([[["Ram", "राम", null, null, 10]], null, "hi"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let translator = translator_for(&server);
        let result = translator
            .translate("राम", Language::Hindi, Language::English)
            .await
            .unwrap();
        assert_eq!(result, "Ram");
    }

    #[tokio::test]
    async fn test_server_error_is_translation_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .mount(&server)
            .await;

        let translator = translator_for(&server);
        let err = translator
            .translate("राम", Language::Hindi, Language::English)
            .await
            .unwrap_err();
        assert!(matches!(err, call_agent_core::Error::Translation(_)));
    }

    #[tokio::test]
    async fn test_same_language_short_circuits() {
        let server = MockServer::start().await;
        let translator = translator_for(&server);
        let result = translator
            .translate("hello", Language::English, Language::English)
            .await
            .unwrap();
        assert_eq!(result, "hello");
    }
}
