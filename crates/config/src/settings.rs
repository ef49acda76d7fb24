//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - missing credentials only warn
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Organization named in prompts, health output and emails
    #[serde(default = "default_organization")]
    pub organization: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub telephony: TelephonyConfig,

    #[serde(default)]
    pub flow: FlowConfig,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,

    #[serde(default)]
    pub translation: TranslationConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_organization() -> String {
    "Prerit Foundation".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: RuntimeEnvironment::default(),
            organization: default_organization(),
            server: ServerConfig::default(),
            telephony: TelephonyConfig::default(),
            flow: FlowConfig::default(),
            llm: LlmSettings::default(),
            knowledge_base: KnowledgeBaseConfig::default(),
            translation: TranslationConfig::default(),
            persistence: PersistenceConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_flow()?;
        self.validate_telephony()?;
        self.validate_llm()?;
        self.validate_persistence()?;
        self.validate_request_budget()?;
        Ok(())
    }

    /// Longest a single webhook can take: the question step translates and
    /// answers, the record steps translate name and email then wait on the sinks
    pub fn step_budget_secs(&self) -> u64 {
        self.flow
            .upstream_timeout_secs
            .saturating_mul(2)
            .saturating_add(self.persistence.record_timeout_secs)
    }

    /// The HTTP timeout must cover the step budget; a mid-call step may never answer 408
    fn validate_request_budget(&self) -> Result<(), ConfigError> {
        let budget = self.step_budget_secs();
        if self.server.timeout_seconds < budget {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: format!(
                    "{}s is shorter than the {}s a webhook step may take \
                     (2 x flow.upstream_timeout_secs + persistence.record_timeout_secs)",
                    self.server.timeout_seconds, budget
                ),
            });
        }
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_flow(&self) -> Result<(), ConfigError> {
        let flow = &self.flow;

        if flow.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "flow.max_attempts".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        for (field, value) in [
            ("flow.gather_timeout_secs", u64::from(flow.gather_timeout_secs)),
            ("flow.question_timeout_secs", u64::from(flow.question_timeout_secs)),
            ("flow.upstream_timeout_secs", flow.upstream_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "Timeout must be at least 1 second".to_string(),
                });
            }
        }

        if call_agent_core::Language::from_code(&flow.language).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "flow.language".to_string(),
                message: format!("Unsupported language tag '{}'", flow.language),
            });
        }

        Ok(())
    }

    fn validate_telephony(&self) -> Result<(), ConfigError> {
        let telephony = &self.telephony;
        let missing: Vec<&str> = [
            ("telephony.account_sid", telephony.account_sid.is_empty()),
            ("telephony.auth_token", telephony.auth_token.is_empty()),
            ("telephony.from_number", telephony.from_number.is_empty()),
            ("server.public_url", self.server.public_url.is_empty()),
        ]
        .into_iter()
        .filter_map(|(field, empty)| empty.then_some(field))
        .collect();

        if missing.is_empty() {
            return Ok(());
        }

        if self.environment.is_strict() {
            return Err(ConfigError::MissingField(missing.join(", ")));
        }

        tracing::warn!(
            fields = %missing.join(", "),
            "Telephony not fully configured, /make-call will fail"
        );
        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            });
        }

        if llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if llm.provider == LlmProvider::Gemini && llm.api_key.is_none() {
            if self.environment.is_strict() {
                return Err(ConfigError::MissingField("llm.api_key".to_string()));
            }
            tracing::warn!("llm.api_key not set, questions will be answered with the apology");
        }

        Ok(())
    }

    fn validate_persistence(&self) -> Result<(), ConfigError> {
        let persistence = &self.persistence;

        if persistence.csv.enabled && persistence.csv.path.is_empty() {
            return Err(ConfigError::MissingField("persistence.csv.path".to_string()));
        }

        let sheets = &persistence.sheets;
        if sheets.enabled {
            if sheets.spreadsheet_id.is_empty() {
                return Err(ConfigError::MissingField(
                    "persistence.sheets.spreadsheet_id".to_string(),
                ));
            }
            if sheets.access_token.is_none() {
                return Err(ConfigError::MissingField(
                    "persistence.sheets.access_token".to_string(),
                ));
            }
        }

        let scylla = &persistence.scylla;
        if scylla.enabled && scylla.hosts.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "persistence.scylla.hosts".to_string(),
                message: "At least one host is required when ScyllaDB is enabled".to_string(),
            });
        }

        let email = &persistence.email;
        if email.enabled {
            for (field, value) in [
                ("persistence.email.smtp_host", &email.smtp_host),
                ("persistence.email.username", &email.username),
                ("persistence.email.password", &email.password),
            ] {
                if value.is_empty() {
                    return Err(ConfigError::MissingField(field.to_string()));
                }
            }
        }

        if persistence.record_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "persistence.record_timeout_secs".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Public base URL the telephony platform can reach (e.g. an ngrok URL)
    #[serde(default)]
    pub public_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    #[serde(default, deserialize_with = "list_or_csv")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: String::new(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Twilio account and dialing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelephonyConfig {
    #[serde(default)]
    pub account_sid: String,

    #[serde(default)]
    pub auth_token: String,

    /// Caller ID used for outbound calls
    #[serde(default)]
    pub from_number: String,

    /// Number dialed by `GET /make-call`
    #[serde(default)]
    pub to_number: String,

    #[serde(default = "default_twilio_api_base")]
    pub api_base: String,

    /// Path of the first webhook, appended to `server.public_url`
    #[serde(default = "default_entry_path")]
    pub entry_path: String,
}

fn default_twilio_api_base() -> String {
    "https://api.twilio.com".to_string()
}

fn default_entry_path() -> String {
    "/voice".to_string()
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            to_number: String::new(),
            api_base: default_twilio_api_base(),
            entry_path: default_entry_path(),
        }
    }
}

/// Which answer engine the Q&A phase uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowVariant {
    /// Open-domain answers from the LLM
    #[default]
    General,
    /// Answers restricted to the knowledge base file
    KnowledgeBase,
}

/// Call flow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default)]
    pub variant: FlowVariant,

    /// Locale tag for speech recognition and synthesis
    #[serde(default = "default_language")]
    pub language: String,

    /// TTS voice name
    #[serde(default = "default_voice")]
    pub voice: String,

    /// SSML prosody rate applied to every spoken line (`None` disables SSML)
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: Option<String>,

    /// Attempts allowed for a required gather before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_gather_timeout")]
    pub gather_timeout_secs: u32,

    /// Longer gather timeout for free-form questions
    #[serde(default = "default_question_timeout")]
    pub question_timeout_secs: u32,

    /// Deadline for LLM and translation calls made inside a webhook
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,

    #[serde(default)]
    pub collect_email: bool,

    #[serde(default = "default_true")]
    pub collect_blood_group: bool,

    /// Optional YAML file overriding the spoken prompts
    #[serde(default)]
    pub script_path: Option<String>,
}

fn default_language() -> String {
    "hi-IN".to_string()
}

fn default_voice() -> String {
    "Polly.Aditi".to_string()
}

fn default_speaking_rate() -> Option<String> {
    Some("fast".to_string())
}

fn default_max_attempts() -> u32 {
    2
}

fn default_gather_timeout() -> u32 {
    5
}

fn default_question_timeout() -> u32 {
    10
}

fn default_upstream_timeout() -> u64 {
    8
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            variant: FlowVariant::default(),
            language: default_language(),
            voice: default_voice(),
            speaking_rate: default_speaking_rate(),
            max_attempts: default_max_attempts(),
            gather_timeout_secs: default_gather_timeout(),
            question_timeout_secs: default_question_timeout(),
            upstream_timeout_secs: default_upstream_timeout(),
            collect_email: false,
            collect_blood_group: true,
            script_path: None,
        }
    }
}

/// LLM provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Ollama,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub provider: LlmProvider,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Per-request HTTP timeout
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_llm_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_llm_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> usize {
    256
}

fn default_llm_timeout() -> u64 {
    8
}

fn default_max_retries() -> u32 {
    1
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_llm_model(),
            endpoint: default_llm_endpoint(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

/// Knowledge base used by the knowledge-base flow variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    #[serde(default = "default_knowledge_base_path")]
    pub path: String,
}

fn default_knowledge_base_path() -> String {
    "data/knowledge.txt".to_string()
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_base_path(),
        }
    }
}

/// Translation provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    #[default]
    Google,
    /// Pass text through unchanged
    Noop,
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default)]
    pub provider: TranslationProvider,

    #[serde(default = "default_translation_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_translation_timeout")]
    pub timeout_secs: u64,
}

fn default_translation_endpoint() -> String {
    "https://translate.googleapis.com".to_string()
}

fn default_translation_timeout() -> u64 {
    5
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            endpoint: default_translation_endpoint(),
            timeout_secs: default_translation_timeout(),
        }
    }
}

/// Profile sinks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub csv: CsvSinkConfig,

    #[serde(default)]
    pub sheets: SheetsConfig,

    #[serde(default)]
    pub scylla: ScyllaSettings,

    #[serde(default)]
    pub email: EmailConfig,

    /// Deadline for each sink write
    #[serde(default = "default_record_timeout")]
    pub record_timeout_secs: u64,
}

fn default_record_timeout() -> u64 {
    10
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            csv: CsvSinkConfig::default(),
            sheets: SheetsConfig::default(),
            scylla: ScyllaSettings::default(),
            email: EmailConfig::default(),
            record_timeout_secs: default_record_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvSinkConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_csv_path")]
    pub path: String,
}

fn default_csv_path() -> String {
    "user_data.csv".to_string()
}

impl Default for CsvSinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_csv_path(),
        }
    }
}

/// Google Sheets append target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub spreadsheet_id: String,

    /// A1 range rows are appended after
    #[serde(default = "default_sheet_range")]
    pub range: String,

    /// OAuth2 bearer token with the spreadsheets scope
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_sheets_api_base")]
    pub api_base: String,
}

fn default_sheet_range() -> String {
    "User data!A:D".to_string()
}

fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            spreadsheet_id: String::new(),
            range: default_sheet_range(),
            access_token: None,
            api_base: default_sheets_api_base(),
        }
    }
}

/// ScyllaDB profile store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScyllaSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_scylla_hosts", deserialize_with = "list_or_csv")]
    pub hosts: Vec<String>,

    #[serde(default = "default_scylla_keyspace")]
    pub keyspace: String,

    #[serde(default = "default_replication_factor")]
    pub replication_factor: u8,
}

fn default_scylla_hosts() -> Vec<String> {
    vec!["127.0.0.1:9042".to_string()]
}

fn default_scylla_keyspace() -> String {
    "call_agent".to_string()
}

fn default_replication_factor() -> u8 {
    1
}

impl Default for ScyllaSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            hosts: default_scylla_hosts(),
            keyspace: default_scylla_keyspace(),
            replication_factor: default_replication_factor(),
        }
    }
}

/// SMTP thank-you email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Sender address; falls back to `username` when empty
    #[serde(default)]
    pub from_address: String,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from_address: String::new(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    /// Install the Prometheus recorder and expose `/metrics`
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Accept either a YAML list or a comma-separated string (as set from the environment)
fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::List(items) => items,
        ListOrCsv::Csv(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// Load settings from `.env`, config files and the environment
///
/// Priority: env vars > config/{env} > config/default > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    // A missing .env is normal outside local development
    if let Err(e) = dotenv::dotenv() {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    // Values stay strings so E.164 numbers keep their leading `+`; typed
    // fields are converted during deserialization
    builder = builder.add_source(Environment::with_prefix("CALL_AGENT").separator("__"));

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
