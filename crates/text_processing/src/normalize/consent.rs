//! Yes/no classification of short spoken replies

use crate::hindi::tokenize;

/// Words that count as "yes"
pub const AFFIRMATIVE_TOKENS: &[&str] = &["हां", "हाँ", "yes", "ha", "haan", "han"];

/// Whether the reply contains an affirmative word
///
/// Matching is per word, case-insensitive. Empty input is a "no".
///
/// # Examples
/// ```
/// use call_agent_text_processing::is_affirmative;
/// assert!(is_affirmative("हां बिलकुल"));
/// assert!(!is_affirmative("no thanks"));
/// assert!(!is_affirmative(""));
/// ```
pub fn is_affirmative(reply: &str) -> bool {
    tokenize(reply)
        .iter()
        .any(|token| AFFIRMATIVE_TOKENS.contains(&token.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_replies() {
        assert!(is_affirmative("हां बिलकुल"));
        assert!(is_affirmative("हाँ।"));
        assert!(is_affirmative("Yes please"));
        assert!(is_affirmative("ha"));
        assert!(is_affirmative("Haan ji"));
    }

    #[test]
    fn test_negative_replies() {
        assert!(!is_affirmative("no thanks"));
        assert!(!is_affirmative("नहीं"));
        assert!(!is_affirmative(""));
        // "ha" inside a longer word is not consent
        assert!(!is_affirmative("that is all"));
        assert!(!is_affirmative("bahut hai"));
    }
}
