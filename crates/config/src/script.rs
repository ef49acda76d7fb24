//! Spoken prompts for the call flow
//!
//! Every line the agent speaks comes from a [`FlowScript`]. Lines may contain
//! `{name}` (the caller's name as recognized) and `{organization}`
//! placeholders, filled in by [`FlowScript::render`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Prompt catalogue, Hindi by default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowScript {
    /// Opening line, asks for the caller's name
    pub greeting: String,
    /// Spoken before re-prompting for the name
    pub name_retry: String,
    /// Spoken before hanging up when no name was heard
    pub name_give_up: String,
    pub ask_email: String,
    pub ask_blood_group: String,
    /// Confirms the profile was saved with a blood group
    pub profile_saved: String,
    /// Confirms the profile was saved without a blood group
    pub profile_saved_without_blood_group: String,
    /// Invites the first question
    pub ask_question: String,
    pub ask_more_questions: String,
    pub thank_you: String,
    /// Spoken when no answer could be produced
    pub answer_unavailable: String,
    /// Spoken when a webhook fails outright
    pub application_error: String,
}

impl Default for FlowScript {
    fn default() -> Self {
        Self {
            greeting: "नमस्ते! मैं {organization} से बात कर रहा हूँ। कृपया अपना नाम बताइए।"
                .to_string(),
            name_retry: "माफ कीजिए, हमें आपकी आवाज़ सुनाई नहीं दी। एक बार फिर कोशिश करते हैं।"
                .to_string(),
            name_give_up:
                "हमें आपका नाम नहीं मिला। कॉल समाप्त की जा रही है। {organization} से संपर्क करने के लिए धन्यवाद।"
                    .to_string(),
            ask_email: "शुक्रिया {name}, कृपया अपना ईमेल पता बताइए।".to_string(),
            ask_blood_group:
                "शुक्रिया {name} अब आपकी सुरक्षा के लिए, कृपया अपना blood group बताइए। यह जानकारी {organization} के पास सुरक्षित रहेगी।"
                    .to_string(),
            profile_saved: "धन्यवाद! {name} आपकी जानकारी {organization} में सुरक्षित कर ली गई है।"
                .to_string(),
            profile_saved_without_blood_group:
                "{name} जी, रक्त समूह प्राप्त नहीं हुआ, फिर भी आपकी जानकारी हमारे पास सुरक्षित है।"
                    .to_string(),
            ask_question:
                "{name}, अब आप कोई भी जानकारी के लिए अपना सवाल पूछ सकते हैं। मैं आपकी मदद करने की कोशिश करूंगा।"
                    .to_string(),
            ask_more_questions: "क्या आप कोई और सवाल पूछना चाहते हैं? हां या ना में जवाब दें।"
                .to_string(),
            thank_you:
                "{name} आपका समय देने के लिए धन्यवाद। {organization} की टीम जल्द ही आपसे संपर्क करेगी।"
                    .to_string(),
            answer_unavailable: "मुझे इस सवाल का जवाब नहीं मिला। कृपया बाद में पुनः प्रयास करें।"
                .to_string(),
            application_error: "Sorry, there was an error with the application.".to_string(),
        }
    }
}

impl FlowScript {
    /// Load a script from YAML; lines missing from the file keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::FileNotFound(format!("{}: {}", path.as_ref().display(), e))
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load from `path` if given, otherwise use the defaults
    pub fn load_or_default(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                let script = Self::load(p)?;
                tracing::info!(path = %p, "Loaded flow script");
                Ok(script)
            }
            None => Ok(Self::default()),
        }
    }

    /// Fill `{name}` and `{organization}` placeholders
    pub fn render(template: &str, name: &str, organization: &str) -> String {
        template
            .replace("{name}", name)
            .replace("{organization}", organization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_render_placeholders() {
        let script = FlowScript::default();
        let line = FlowScript::render(&script.ask_blood_group, "राम", "Prerit Foundation");
        assert!(line.starts_with("शुक्रिया राम"));
        assert!(line.contains("Prerit Foundation"));
        assert!(!line.contains('{'));
    }

    #[test]
    fn test_load_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "greeting: \"Hello! Please tell me your name.\"").unwrap();

        let script = FlowScript::load(file.path()).unwrap();
        assert_eq!(script.greeting, "Hello! Please tell me your name.");
        assert_eq!(script.thank_you, FlowScript::default().thank_you);
    }

    #[test]
    fn test_load_missing_file() {
        let result = FlowScript::load("/nonexistent/script.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(
            FlowScript::load_or_default(None).unwrap(),
            FlowScript::default()
        );
    }
}
