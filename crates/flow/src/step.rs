//! Call flow steps
//!
//! Every step is one webhook endpoint. Prompt steps speak and gather; handler
//! steps receive the gathered speech and decide where the call goes next.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in the call flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Opening greeting, asks for the name
    #[default]
    Greeting,
    AwaitName,
    AskEmail,
    AwaitEmail,
    AskBloodGroup,
    AwaitBloodGroup,
    /// Invites a question
    AwaitFollowupConsent,
    AwaitQuestion,
    AwaitMoreQuestionsConsent,
    /// Closing message and hangup
    ThankYou,
}

impl Step {
    pub const ALL: [Step; 10] = [
        Step::Greeting,
        Step::AwaitName,
        Step::AskEmail,
        Step::AwaitEmail,
        Step::AskBloodGroup,
        Step::AwaitBloodGroup,
        Step::AwaitFollowupConsent,
        Step::AwaitQuestion,
        Step::AwaitMoreQuestionsConsent,
        Step::ThankYou,
    ];

    /// Webhook path serving this step
    pub fn path(&self) -> &'static str {
        match self {
            Step::Greeting => "/voice",
            Step::AwaitName => "/handle-name",
            Step::AskEmail => "/voice-email",
            Step::AwaitEmail => "/handle-email",
            Step::AskBloodGroup => "/voice-blood",
            Step::AwaitBloodGroup => "/handle-blood",
            Step::AwaitFollowupConsent => "/voice-question",
            Step::AwaitQuestion => "/handle-question",
            Step::AwaitMoreQuestionsConsent => "/handle-more-questions",
            Step::ThankYou => "/thank-you",
        }
    }

    pub fn from_path(path: &str) -> Option<Step> {
        let path = path.split('?').next().unwrap_or(path).trim_end_matches('/');
        Step::ALL.into_iter().find(|step| step.path() == path)
    }

    /// Stable name for logs and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Greeting => "greeting",
            Step::AwaitName => "await_name",
            Step::AskEmail => "ask_email",
            Step::AwaitEmail => "await_email",
            Step::AskBloodGroup => "ask_blood_group",
            Step::AwaitBloodGroup => "await_blood_group",
            Step::AwaitFollowupConsent => "await_followup_consent",
            Step::AwaitQuestion => "await_question",
            Step::AwaitMoreQuestionsConsent => "await_more_questions_consent",
            Step::ThankYou => "thank_you",
        }
    }

    /// Whether this step consumes gathered speech
    pub fn expects_speech(&self) -> bool {
        matches!(
            self,
            Step::AwaitName
                | Step::AwaitEmail
                | Step::AwaitBloodGroup
                | Step::AwaitQuestion
                | Step::AwaitMoreQuestionsConsent
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::ThankYou)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_unique_and_round_trip() {
        for step in Step::ALL {
            assert_eq!(Step::from_path(step.path()), Some(step));
        }
        let mut paths: Vec<_> = Step::ALL.iter().map(|s| s.path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), Step::ALL.len());
    }

    #[test]
    fn test_from_path_ignores_query_and_trailing_slash() {
        assert_eq!(Step::from_path("/handle-name?attempt=2"), Some(Step::AwaitName));
        assert_eq!(Step::from_path("/thank-you/"), Some(Step::ThankYou));
        assert_eq!(Step::from_path("/voice-coding"), None);
    }

    #[test]
    fn test_only_thank_you_is_terminal() {
        assert_eq!(Step::ALL.iter().filter(|s| s.is_terminal()).count(), 1);
        assert!(!Step::Greeting.expects_speech());
        assert!(Step::AwaitQuestion.expects_speech());
    }
}
