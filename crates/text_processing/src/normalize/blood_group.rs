//! Spoken blood group normalization

use crate::hindi::tokenize;

const POSITIVE_WORDS: &[&str] = &["positive", "पॉजिटिव", "पॉज़िटिव", "पोजिटिव", "+ve"];
const NEGATIVE_WORDS: &[&str] = &["negative", "नेगेटिव", "निगेटिव", "-ve"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rh {
    Positive,
    Negative,
}

impl Rh {
    fn suffix(self) -> &'static str {
        match self {
            Rh::Positive => "+",
            Rh::Negative => "-",
        }
    }
}

fn is_a(token: &str) -> bool {
    matches!(token, "a" | "ए")
}

fn is_b(token: &str) -> bool {
    matches!(token, "b" | "बी")
}

fn is_o(token: &str) -> bool {
    matches!(token, "o" | "ओ" | "0")
}

fn is_ab(token: &str) -> bool {
    matches!(token, "ab" | "एबी")
}

/// Rh sign from a sign word or a `+`/`-` attached to a token
fn detect_rh(lower: &str, tokens: &[String]) -> Option<Rh> {
    if POSITIVE_WORDS.iter().any(|w| lower.contains(w)) {
        return Some(Rh::Positive);
    }
    if NEGATIVE_WORDS.iter().any(|w| lower.contains(w)) {
        return Some(Rh::Negative);
    }
    tokens.iter().find_map(|t| {
        if t.ends_with('+') {
            Some(Rh::Positive)
        } else if t.ends_with('-') {
            Some(Rh::Negative)
        } else {
            None
        }
    })
}

/// ABO letter, checked in precedence order AB, A, B, O
fn detect_letters(tokens: &[&str]) -> Option<&'static str> {
    if tokens.iter().any(|t| is_ab(t)) {
        return Some("AB");
    }
    if tokens.windows(2).any(|pair| is_a(pair[0]) && is_b(pair[1])) {
        return Some("AB");
    }
    if tokens.iter().any(|t| is_a(t)) {
        return Some("A");
    }
    if tokens.iter().any(|t| is_b(t)) {
        return Some("B");
    }
    if tokens.iter().any(|t| is_o(t)) {
        return Some("O");
    }
    None
}

/// Turn a spoken blood group into `A+`, `O-`, `AB` and similar
///
/// Letters are matched on whole words, so the `a` inside "negative" never
/// counts as blood group A. Unrecognized input is returned lower-cased and
/// otherwise unchanged.
///
/// # Examples
/// ```
/// use call_agent_text_processing::format_blood_group;
/// assert_eq!(format_blood_group("A positive"), "A+");
/// assert_eq!(format_blood_group("O negative"), "O-");
/// assert_eq!(format_blood_group("AB"), "AB");
/// assert_eq!(format_blood_group("Not Sure"), "not sure");
/// ```
pub fn format_blood_group(spoken: &str) -> String {
    let lower = spoken.trim().to_lowercase();
    if lower.is_empty() {
        return String::new();
    }

    let tokens = tokenize(&lower);
    let rh = detect_rh(&lower, &tokens);

    let letters: Vec<&str> = tokens
        .iter()
        .map(|t| t.trim_end_matches(['+', '-']))
        .filter(|t| !t.is_empty())
        .collect();

    match detect_letters(&letters) {
        Some(group) => match rh {
            Some(rh) => format!("{}{}", group, rh.suffix()),
            None => group.to_string(),
        },
        None => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_phrases() {
        assert_eq!(format_blood_group("A positive"), "A+");
        assert_eq!(format_blood_group("O negative"), "O-");
        assert_eq!(format_blood_group("B Positive"), "B+");
        assert_eq!(format_blood_group("AB negative"), "AB-");
        assert_eq!(format_blood_group("AB"), "AB");
    }

    #[test]
    fn test_hindi_phrases() {
        assert_eq!(format_blood_group("A पॉजिटिव"), "A+");
        assert_eq!(format_blood_group("ए पॉज़िटिव"), "A+");
        assert_eq!(format_blood_group("बी नेगेटिव"), "B-");
        assert_eq!(format_blood_group("ओ पॉजिटिव"), "O+");
        assert_eq!(format_blood_group("एबी"), "AB");
    }

    #[test]
    fn test_symbol_forms() {
        assert_eq!(format_blood_group("O+"), "O+");
        assert_eq!(format_blood_group("ab-"), "AB-");
        assert_eq!(format_blood_group("a b positive"), "AB+");
    }

    #[test]
    fn test_sign_word_letters_do_not_count() {
        // "negative" contains an 'a'; "positive" an 'o'
        assert_eq!(format_blood_group("O negative."), "O-");
        assert_eq!(format_blood_group("B positive"), "B+");
    }

    #[test]
    fn test_unrecognized_passthrough() {
        assert_eq!(format_blood_group("Not Sure"), "not sure");
        assert_eq!(format_blood_group("positive"), "positive");
        assert_eq!(format_blood_group(""), "");
    }
}
