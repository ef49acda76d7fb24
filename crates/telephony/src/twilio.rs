//! Twilio REST client
//!
//! Places outbound calls with `POST /2010-04-01/Accounts/{sid}/Calls.json`.
//! The platform fetches `webhook_url` once the callee answers.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use call_agent_config::TelephonyConfig;
use call_agent_core::{CallRequest, PlacedCall, Result, TelephonyGateway};

use crate::TelephonyError;

#[derive(Debug, Deserialize)]
struct CallResource {
    sid: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Outbound call placement over the Twilio REST API
#[derive(Clone)]
pub struct TwilioGateway {
    client: Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
}

impl TwilioGateway {
    pub fn new(config: &TelephonyConfig, timeout: Duration) -> std::result::Result<Self, TelephonyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TelephonyError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn calls_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Calls.json",
            self.api_base, self.account_sid
        )
    }

    async fn create_call(&self, request: &CallRequest) -> std::result::Result<PlacedCall, TelephonyError> {
        if self.account_sid.is_empty() || self.auth_token.is_empty() {
            return Err(TelephonyError::Configuration(
                "telephony.account_sid and telephony.auth_token are required".to_string(),
            ));
        }

        let response = self
            .client
            .post(self.calls_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", request.to.as_str()),
                ("From", request.from.as_str()),
                ("Url", request.webhook_url.as_str()),
                ("Method", "POST"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or(body);
            return Err(TelephonyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let call: CallResource = response
            .json()
            .await
            .map_err(|e| TelephonyError::InvalidResponse(e.to_string()))?;

        Ok(PlacedCall {
            sid: call.sid,
            status: call.status,
        })
    }
}

#[async_trait]
impl TelephonyGateway for TwilioGateway {
    async fn place_call(&self, request: &CallRequest) -> Result<PlacedCall> {
        match self.create_call(request).await {
            Ok(call) => {
                metrics::counter!("call_agent_calls_placed_total", "result" => "ok").increment(1);
                tracing::info!(call_sid = %call.sid, to = %request.to, status = %call.status, "Outbound call placed");
                Ok(call)
            }
            Err(e) => {
                metrics::counter!("call_agent_calls_placed_total", "result" => "error").increment(1);
                tracing::error!(to = %request.to, error = %e, "Failed to place outbound call");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(server: &MockServer) -> TwilioGateway {
        TwilioGateway::new(
            &TelephonyConfig {
                account_sid: "AC123".to_string(),
                auth_token: "secret".to_string(),
                api_base: server.uri(),
                ..Default::default()
            },
            Duration::from_secs(2),
        )
        .unwrap()
    }

    fn request() -> CallRequest {
        CallRequest {
            to: "+919876543210".to_string(),
            from: "+15005550006".to_string(),
            webhook_url: "https://agent.example.org/voice".to_string(),
        }
    }

    #[tokio::test]
    async fn test_place_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Calls.json"))
            .and(header_exists("authorization"))
            .and(body_string_contains("To=%2B919876543210"))
            .and(body_string_contains("Url=https%3A%2F%2Fagent.example.org%2Fvoice"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"sid": "CA42", "status": "queued"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let call = gateway_for(&server).place_call(&request()).await.unwrap();
        assert_eq!(call.sid, "CA42");
        assert_eq!(call.status, "queued");
    }

    #[tokio::test]
    async fn test_api_error_message_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 21211,
                "message": "The 'To' number is not a valid phone number.",
                "status": 400
            })))
            .mount(&server)
            .await;

        let err = gateway_for(&server).place_call(&request()).await.unwrap_err();
        assert!(matches!(err, call_agent_core::Error::Telephony(_)));
        assert!(err.to_string().contains("not a valid phone number"));
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let gateway = TwilioGateway::new(&TelephonyConfig::default(), Duration::from_secs(1)).unwrap();
        let err = gateway.place_call(&request()).await.unwrap_err();
        assert!(matches!(err, call_agent_core::Error::Config(_)));
    }
}
