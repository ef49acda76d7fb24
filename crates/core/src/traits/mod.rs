//! Core traits for the call agent
//!
//! Every external collaborator of the call flow sits behind one of these
//! traits so it can be swapped by configuration or replaced by a fake in tests.
//!
//! ```text
//! Telephony:
//!   - TelephonyGateway: place an outbound call
//!
//! Answering:
//!   - AnswerEngine: answer a caller's (English) question
//!
//! Text processing:
//!   - Translator: translate recognized speech
//!
//! Persistence:
//!   - ProfileSink: record a caller profile
//!   - ConversationLogger: record each handled step
//! ```

mod answer;
mod persistence;
mod telephony;
mod text_processing;

pub use answer::AnswerEngine;
pub use persistence::{ConversationLogger, ProfileSink};
pub use telephony::{CallRequest, PlacedCall, TelephonyGateway};
pub use text_processing::Translator;
