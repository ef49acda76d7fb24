//! LLM Backend implementations
//!
//! Every backend is a single non-streaming request per question: the caller
//! hears the whole answer in one `<Say>`, so there is nothing to stream into.
//! Transient failures (network errors, 5xx, timeouts) are retried with
//! exponential backoff; 4xx responses fail immediately.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

use call_agent_config::LlmSettings;

use crate::prompt::Message;
use crate::LlmError;

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// API endpoint
    pub endpoint: String,
    /// API key (optional)
    pub api_key: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry)
    pub initial_backoff: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "qwen3:4b-instruct-2507-q4_K_M".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            api_key: None,
            max_tokens: 256,
            temperature: 0.7,
            timeout: Duration::from_secs(8),
            max_retries: 1,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

impl From<&LlmSettings> for LlmConfig {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            model: settings.model.clone(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
            max_retries: settings.max_retries,
            ..Default::default()
        }
    }
}

/// LLM generation result
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,
    /// Tokens generated
    pub tokens: usize,
    /// Total generation time (ms), including retries
    pub total_time_ms: u64,
    pub finish_reason: FinishReason,
}

/// Finish reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    Safety,
    Other,
}

/// LLM Backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError>;

    /// Check if model is available
    async fn is_available(&self) -> bool;

    /// Get model name
    fn model_name(&self) -> &str;

    /// Estimate tokens
    ///
    /// Devanagari packs fewer graphemes per token than Latin script, so the
    /// ratio switches when the text is mostly Hindi.
    fn estimate_tokens(&self, text: &str) -> usize {
        use unicode_segmentation::UnicodeSegmentation;

        let grapheme_count = text.graphemes(true).count();

        let devanagari_count = text
            .chars()
            .filter(|c| ('\u{0900}'..='\u{097F}').contains(c))
            .count();

        if devanagari_count > grapheme_count / 3 {
            grapheme_count.max(1) / 2
        } else {
            grapheme_count.max(1) / 4
        }
    }
}

/// Whether an error is worth retrying
pub(crate) fn is_retryable(error: &LlmError) -> bool {
    matches!(error, LlmError::Network(_) | LlmError::Timeout)
}

/// Run `op` until it succeeds, fails with a non-retryable error, or retries run out
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    config: &LlmConfig,
    mut op: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut last_error = None;
    let mut backoff = config.initial_backoff;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            tracing::warn!(
                "LLM request failed, retrying in {:?} (attempt {}/{})",
                backoff,
                attempt,
                config.max_retries
            );
            tokio::time::sleep(backoff).await;
            backoff *= 2;
        }

        match op().await {
            Ok(result) => return Ok(result),
            Err(e) if is_retryable(&e) => last_error = Some(e),
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| LlmError::Network("Max retries exceeded".to_string())))
}

/// Map an unsuccessful HTTP status to an error; 5xx is retryable, 4xx is not
pub(crate) async fn error_for_status(response: reqwest::Response) -> LlmError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status.is_server_error() {
        LlmError::Network(format!("Server error {}: {}", status, body))
    } else {
        LlmError::Api(format!("HTTP {}: {}", status, body))
    }
}

/// Ollama backend for self-hosted models
#[derive(Clone)]
pub struct OllamaBackend {
    client: Client,
    config: LlmConfig,
}

impl OllamaBackend {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.config.endpoint, path)
    }

    async fn execute_request(
        &self,
        request: &OllamaChatRequest,
    ) -> Result<OllamaChatResponse, LlmError> {
        let response = self
            .client
            .post(self.api_url("/chat"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        let start = Instant::now();

        let request = OllamaChatRequest {
            model: self.config.model.clone(),
            messages: messages.iter().map(|m| m.into()).collect(),
            stream: false,
            options: Some(OllamaOptions {
                temperature: Some(self.config.temperature),
                num_predict: Some(self.config.max_tokens as i32),
            }),
            think: Some(false),
        };

        let result = retry_with_backoff(&self.config, || self.execute_request(&request)).await?;

        Ok(GenerationResult {
            text: result.message.content.trim().to_string(),
            tokens: result.eval_count.unwrap_or(0) as usize,
            total_time_ms: start.elapsed().as_millis() as u64,
            finish_reason: if result.done {
                FinishReason::Stop
            } else {
                FinishReason::Length
            },
        })
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(self.api_url("/tags"))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Ollama API types
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    /// Disable extended thinking for models like qwen3/deepseek-r1
    #[serde(skip_serializing_if = "Option::is_none")]
    think: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

impl From<&Message> for OllamaMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role.to_string(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    done: bool,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::Role;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_config_from_settings() {
        let settings = LlmSettings {
            endpoint: "http://localhost:11434/".to_string(),
            timeout_secs: 3,
            ..Default::default()
        };
        let config = LlmConfig::from(&settings);
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_message_conversion() {
        let msg = Message {
            role: Role::User,
            content: "Hello".to_string(),
        };
        let ollama_msg: OllamaMessage = (&msg).into();
        assert_eq!(ollama_msg.role, "user");
        assert_eq!(ollama_msg.content, "Hello");
    }

    #[test]
    fn test_estimate_tokens_devanagari() {
        let backend = OllamaBackend::new(LlmConfig::default()).unwrap();
        let hindi = backend.estimate_tokens("रक्तदान शिविर हर रविवार को होता है");
        let english = backend.estimate_tokens("Blood camps are held every Sunday");
        assert!(hindi > 0 && english > 0);
    }

    #[tokio::test]
    async fn test_retry_stops_on_client_error() {
        let config = LlmConfig {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1),
            ..Default::default()
        };
        let calls = AtomicU32::new(0);
        let result: Result<(), LlmError> = retry_with_backoff(&config, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::Api("400".to_string()))
        })
        .await;
        assert!(matches!(result, Err(LlmError::Api(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_exhausts_on_network_error() {
        let config = LlmConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            ..Default::default()
        };
        let calls = AtomicU32::new(0);
        let result: Result<(), LlmError> = retry_with_backoff(&config, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::Network("reset".to_string()))
        })
        .await;
        assert!(matches!(result, Err(LlmError::Network(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_ollama_generate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": " रक्तदान सुरक्षित है। "},
                "done": true,
                "eval_count": 12
            })))
            .mount(&server)
            .await;

        let backend = OllamaBackend::new(LlmConfig {
            endpoint: server.uri(),
            ..Default::default()
        })
        .unwrap();

        let result = backend
            .generate(&[Message::user("Is blood donation safe?")])
            .await
            .unwrap();
        assert_eq!(result.text, "रक्तदान सुरक्षित है।");
        assert_eq!(result.tokens, 12);
        assert_eq!(result.finish_reason, FinishReason::Stop);
    }
}
