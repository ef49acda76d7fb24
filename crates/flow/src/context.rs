//! Flow context carried in redirect URLs
//!
//! The server keeps no per-call state. Everything collected so far travels in
//! the query string of the next webhook URL, so each request rebuilds the
//! context from its own parameters. Parsing is lenient: a missing or garbled
//! value degrades to its default instead of failing the call.

use std::collections::HashMap;

use crate::step::Step;

/// Current wire format version
pub const CONTEXT_VERSION: u32 = 1;

const KEY_VERSION: &str = "v";
const KEY_ATTEMPT: &str = "attempt";
const KEY_NAME: &str = "name";
const KEY_EMAIL: &str = "email";
const KEY_BLOOD_GROUP: &str = "blood_group";
const KEY_CALL_SID: &str = "call_sid";

/// Per-call state reconstructed from query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowContext {
    pub version: u32,
    /// Retry counter for the current gather, starting at 1
    pub attempt: u32,
    /// Name as recognized, untranslated
    pub name: String,
    /// Email utterance as recognized, unformatted
    pub email: String,
    /// Blood group utterance as recognized, unformatted
    pub blood_group: String,
    pub call_sid: Option<String>,
    /// Callee number from the webhook form; never written to the query
    pub phone_number: Option<String>,
}

impl Default for FlowContext {
    fn default() -> Self {
        Self {
            version: CONTEXT_VERSION,
            attempt: 1,
            name: String::new(),
            email: String::new(),
            blood_group: String::new(),
            call_sid: None,
            phone_number: None,
        }
    }
}

impl FlowContext {
    /// Build from decoded query parameters
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let version = match params.get(KEY_VERSION) {
            None => CONTEXT_VERSION,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(v) if v == CONTEXT_VERSION => v,
                _ => {
                    tracing::warn!(version = %raw, "Unknown flow context version, parsing leniently");
                    CONTEXT_VERSION
                }
            },
        };

        let attempt = params
            .get(KEY_ATTEMPT)
            .and_then(|a| a.trim().parse::<u32>().ok())
            .filter(|a| *a >= 1)
            .unwrap_or(1);

        let text = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        Self {
            version,
            attempt,
            name: text(KEY_NAME),
            email: text(KEY_EMAIL),
            blood_group: text(KEY_BLOOD_GROUP),
            call_sid: Some(text(KEY_CALL_SID)).filter(|s| !s.is_empty()),
            phone_number: None,
        }
    }

    /// Build from a raw (percent-encoded) query string
    pub fn from_query(query: &str) -> Self {
        let params = query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect();
        Self::from_params(&params)
    }

    /// Encode as a query string; empty fields are omitted
    pub fn to_query(&self) -> String {
        let mut pairs = vec![
            format!("{}={}", KEY_VERSION, CONTEXT_VERSION),
            format!("{}={}", KEY_ATTEMPT, self.attempt.max(1)),
        ];
        for (key, value) in [
            (KEY_NAME, self.name.as_str()),
            (KEY_EMAIL, self.email.as_str()),
            (KEY_BLOOD_GROUP, self.blood_group.as_str()),
            (KEY_CALL_SID, self.call_sid.as_deref().unwrap_or("")),
        ] {
            if !value.is_empty() {
                pairs.push(format!("{}={}", key, urlencoding::encode(value)));
            }
        }
        pairs.join("&")
    }

    /// Relative webhook URL for `step` carrying this context
    pub fn url_for(&self, step: Step) -> String {
        format!("{}?{}", step.path(), self.to_query())
    }

    /// Same context with the attempt counter set
    pub fn with_attempt(&self, attempt: u32) -> Self {
        Self {
            attempt: attempt.max(1),
            ..self.clone()
        }
    }

    /// Fill the call id from the webhook form when the query lacks one
    pub fn with_call_sid(mut self, call_sid: Option<&str>) -> Self {
        if self.call_sid.is_none() {
            self.call_sid = call_sid.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        }
        self
    }

    /// Attach the callee number posted with the webhook
    pub fn with_phone_number(mut self, phone: Option<&str>) -> Self {
        self.phone_number = phone.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        self
    }

    /// Identifier for persisted records: the call id, or a fresh UUID
    pub fn conversation_id(&self) -> String {
        self.call_sid
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}
