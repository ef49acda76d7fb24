//! Google Gemini backend
//!
//! `generateContent` takes the system prompt separately from the turn list,
//! so system messages are folded into `systemInstruction` and every other
//! message becomes a `contents` entry.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::backend::{error_for_status, retry_with_backoff, FinishReason, GenerationResult, LlmBackend, LlmConfig};
use crate::prompt::{Message, Role};
use crate::LlmError;

/// Gemini backend
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    config: LlmConfig,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::Configuration("Gemini requires an API key".to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn build_request(&self, messages: &[Message]) -> GenerateRequest {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let contents = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| Content {
                role: Some(match m.role {
                    Role::Assistant => "model".to_string(),
                    _ => "user".to_string(),
                }),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GenerateRequest {
            contents,
            system_instruction: (!system.is_empty()).then(|| Content {
                role: None,
                parts: vec![Part {
                    text: system.join("\n\n"),
                }],
            }),
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens as u32,
            },
        }
    }

    async fn execute_request(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
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

fn parse_finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("STOP") | None => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
            FinishReason::Safety
        }
        Some(_) => FinishReason::Other,
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        let start = Instant::now();
        let request = self.build_request(messages);

        let response = retry_with_backoff(&self.config, || self.execute_request(&request)).await?;

        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            LlmError::Blocked(reason)
        })?;

        let finish_reason = parse_finish_reason(candidate.finish_reason.as_deref());
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(if finish_reason == FinishReason::Safety {
                LlmError::Blocked("safety".to_string())
            } else {
                LlmError::InvalidResponse("empty answer".to_string())
            });
        }

        let tokens = response
            .usage_metadata
            .and_then(|u| u.candidates_token_count)
            .map(|n| n as usize)
            .unwrap_or_else(|| self.estimate_tokens(&text));

        tracing::debug!(
            model = %self.config.model,
            tokens,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Gemini answer generated"
        );

        Ok(GenerationResult {
            text: text.trim().to_string(),
            tokens,
            total_time_ms: start.elapsed().as_millis() as u64,
            finish_reason,
        })
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/models/{}", self.config.endpoint, self.config.model))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Gemini API types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    candidates_token_count: Option<u64>,
}
