//! Google Sheets profile log
//!
//! Appends one row per profile through the Sheets v4 `values:append` endpoint.
//! Authentication is a pre-issued OAuth bearer token; minting tokens from a
//! service-account key is left to the deployment.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use call_agent_config::SheetsConfig;
use call_agent_core::{ProfileSink, Result, UserProfile};

use crate::PersistenceError;

/// Appends profiles to a spreadsheet range
pub struct SheetsProfileSink {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    range: String,
    access_token: String,
}

impl SheetsProfileSink {
    pub fn new(config: &SheetsConfig, timeout: Duration) -> std::result::Result<Self, PersistenceError> {
        if config.spreadsheet_id.trim().is_empty() {
            return Err(PersistenceError::Configuration(
                "persistence.sheets.spreadsheet_id is empty".to_string(),
            ));
        }
        let access_token = config
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                PersistenceError::Configuration("persistence.sheets.access_token is not set".to_string())
            })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PersistenceError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.range.clone(),
            access_token,
        })
    }

    fn append_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}:append",
            self.api_base,
            self.spreadsheet_id,
            urlencoding::encode(&self.range)
        )
    }

    async fn append_row(&self, profile: &UserProfile) -> std::result::Result<(), PersistenceError> {
        let body = json!({
            "values": [[
                profile.name,
                profile.email,
                profile.blood_group,
                profile.registered_at_display(),
            ]]
        });

        let response = self
            .client
            .post(self.append_url())
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistenceError::Http(format!("Sheets append failed ({}): {}", status, body)));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileSink for SheetsProfileSink {
    async fn record(&self, profile: &UserProfile) -> Result<()> {
        self.append_row(profile).await?;
        tracing::info!(
            spreadsheet_id = %self.spreadsheet_id,
            name = %profile.name,
            "Profile appended to Google Sheet"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "sheets"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> SheetsConfig {
        SheetsConfig {
            enabled: true,
            spreadsheet_id: "sheet123".to_string(),
            access_token: Some("token".to_string()),
            api_base: server.uri(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_token_rejected() {
        let config = SheetsConfig {
            spreadsheet_id: "sheet123".to_string(),
            access_token: None,
            ..Default::default()
        };
        assert!(SheetsProfileSink::new(&config, Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_append_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets/sheet123/values/User%20data%21A%3AD:append"))
            .and(query_param("valueInputOption", "USER_ENTERED"))
            .and(header("authorization", "Bearer token"))
            .and(body_partial_json(json!({"values": [["Ram", "", "A+"]]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updates": {"updatedRows": 1}})))
            .expect(1)
            .mount(&server)
            .await;

        let sink = SheetsProfileSink::new(&config_for(&server), Duration::from_secs(2)).unwrap();
        sink.record(&UserProfile::new("Ram", "", "A+")).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_append_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
            .mount(&server)
            .await;

        let sink = SheetsProfileSink::new(&config_for(&server), Duration::from_secs(2)).unwrap();
        let err = sink.record(&UserProfile::new("Ram", "", "A+")).await.unwrap_err();
        assert!(matches!(err, call_agent_core::Error::Persistence(_)));
    }
}
