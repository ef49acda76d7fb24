//! Hindi / Devanagari helpers shared by the normalizers

/// Punctuation that separates spoken words, including the Devanagari danda
const WORD_SEPARATORS: &[char] = &[',', '.', '!', '?', ';', ':', '"', '\'', '।', '॥', '(', ')'];

/// Whether a character is in the Devanagari block (U+0900 to U+097F)
pub fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Whether the text contains any Devanagari script
pub fn contains_devanagari(text: &str) -> bool {
    text.chars().any(is_devanagari)
}

/// Split recognized speech into lower-cased word tokens
///
/// Splits on whitespace and sentence punctuation. `+`, `-` and `@` stay inside
/// tokens so that "A+" or "ram@gmail" survive as one word.
///
/// # Examples
/// ```
/// use call_agent_text_processing::hindi::tokenize;
/// assert_eq!(tokenize("हां, बिलकुल!"), vec!["हां", "बिलकुल"]);
/// assert_eq!(tokenize("Yes. O+"), vec!["yes", "o+"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || WORD_SEPARATORS.contains(&c))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devanagari_detection() {
        assert!(contains_devanagari("A पॉजिटिव"));
        assert!(!contains_devanagari("A positive"));
        assert!(is_devanagari('ए'));
    }

    #[test]
    fn test_tokenize_danda_and_punctuation() {
        assert_eq!(tokenize("हाँ। ठीक है"), vec!["हाँ", "ठीक", "है"]);
        assert_eq!(tokenize("  "), Vec::<String>::new());
        assert_eq!(tokenize("AB-"), vec!["ab-"]);
    }
}
