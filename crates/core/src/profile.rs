//! Caller profile and conversation log records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a profile was recorded with every requested field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    #[default]
    Complete,
    Partial,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Partial => "partial",
        }
    }
}

/// Profile recorded once per call that gets past the blood-group step
///
/// `name` and `email` hold the translated, normalized values; the raw
/// utterances only ever live in the call's redirect parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub blood_group: String,
    pub registered_at: DateTime<Utc>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub status: ProfileStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl UserProfile {
    /// Create a profile stamped with the current time
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        blood_group: impl Into<String>,
    ) -> Self {
        let mut profile = Self {
            name: name.into(),
            email: email.into(),
            blood_group: blood_group.into(),
            registered_at: Utc::now(),
            conversation_id: None,
            phone_number: None,
            status: ProfileStatus::Complete,
            notes: None,
        };
        if profile.blood_group.is_empty() {
            profile.status = ProfileStatus::Partial;
        }
        profile
    }

    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn with_phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    /// Registration timestamp in the `YYYY-MM-DD HH:MM:SS` form used by tabular sinks
    pub fn registered_at_display(&self) -> String {
        self.registered_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Whether a follow-up email can be addressed to this caller
    pub fn has_deliverable_email(&self) -> bool {
        self.email.contains('@')
    }
}

/// One handled step of a call, written to the conversation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationLogEntry {
    pub conversation_id: String,
    pub step: String,
    pub user_input: String,
    pub agent_response: String,
    pub language: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationLogEntry {
    pub fn new(
        conversation_id: impl Into<String>,
        step: impl Into<String>,
        user_input: impl Into<String>,
        agent_response: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            step: step.into(),
            user_input: user_input.into(),
            agent_response: agent_response.into(),
            language: language.into(),
            status: "completed".to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_blood_group_marks_partial() {
        let profile = UserProfile::new("Ram", "", "");
        assert_eq!(profile.status, ProfileStatus::Partial);

        let profile = UserProfile::new("Ram", "", "A+");
        assert_eq!(profile.status, ProfileStatus::Complete);
    }

    #[test]
    fn test_registered_at_display() {
        let mut profile = UserProfile::new("Ram", "ram@gmail.com", "O-");
        profile.registered_at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(profile.registered_at_display(), "2024-03-09 14:05:07");
        assert!(profile.has_deliverable_email());
    }
}
