//! Normalizers for spoken values
//!
//! All functions here are pure and total: any input string yields an output
//! string, and unrecognized input degrades to (lower-cased) passthrough.

mod blood_group;
mod consent;
mod email;

pub use blood_group::format_blood_group;
pub use consent::{is_affirmative, AFFIRMATIVE_TOKENS};
pub use email::format_email;
