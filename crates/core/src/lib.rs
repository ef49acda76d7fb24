//! Core traits and types for the call agent
//!
//! This crate provides foundational types used across all other crates:
//! - Seam traits for pluggable collaborators (telephony, answering, translation, sinks)
//! - Language definitions for speech and translation
//! - The persisted caller profile and conversation log records
//! - Error types

pub mod error;
pub mod language;
pub mod profile;
pub mod traits;

pub use error::{Error, Result};
pub use language::Language;
pub use profile::{ConversationLogEntry, ProfileStatus, UserProfile};

pub use traits::{
    AnswerEngine, CallRequest, ConversationLogger, PlacedCall, ProfileSink, TelephonyGateway,
    Translator,
};
