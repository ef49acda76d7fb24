//! Configuration management for the call agent
//!
//! Supports loading configuration from:
//! - `.env` file (loaded into the process environment first)
//! - YAML/TOML files under `config/`
//! - Environment variables (`CALL_AGENT__` prefix, `__` separator)
//!
//! Spoken prompts live separately in a [`FlowScript`], which has Hindi
//! defaults and can be overridden from a YAML file.

pub mod script;
pub mod settings;

pub use script::FlowScript;
pub use settings::{
    load_settings, CsvSinkConfig, EmailConfig, FlowConfig, FlowVariant, KnowledgeBaseConfig,
    LlmProvider, LlmSettings, ObservabilityConfig, PersistenceConfig, RuntimeEnvironment,
    ScyllaSettings, ServerConfig, Settings, SheetsConfig, TelephonyConfig, TranslationConfig,
    TranslationProvider,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for call_agent_core::Error {
    fn from(err: ConfigError) -> Self {
        call_agent_core::Error::Config(err.to_string())
    }
}
