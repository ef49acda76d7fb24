//! Text processing for recognized speech
//!
//! This crate turns raw speech-recognition output into the values the call
//! flow stores and branches on:
//! - **Normalization**: spoken email addresses and blood groups to canonical form
//! - **Consent**: yes/no classification of short replies
//! - **Translation**: Hindi (or mixed) speech to English, with a lenient
//!   wrapper that never fails the call
//!
//! # Example
//!
//! ```
//! use call_agent_text_processing::{format_blood_group, format_email, is_affirmative};
//!
//! assert_eq!(format_blood_group("A positive"), "A+");
//! assert_eq!(format_email("ram at gmail dot com"), "ram@gmail.com");
//! assert!(is_affirmative("हां बिलकुल"));
//! ```

pub mod hindi;
pub mod normalize;
pub mod translation;

mod error;

pub use error::{Result, TextProcessingError};
pub use normalize::{format_blood_group, format_email, is_affirmative};
pub use translation::{
    create_translator, translate_lenient, try_translate, GoogleTranslator, NoopTranslator,
    TRANSLATION_FAILED_SUFFIX,
};
