//! Spoken email address normalization

use once_cell::sync::Lazy;
use regex::Regex;

/// Provider keyword heard in speech, and the domain it implies
const PROVIDERS: &[(&str, &str)] = &[
    ("gmail", "gmail.com"),
    ("yahoo", "yahoo.com"),
    ("hotmail", "hotmail.com"),
    ("outlook", "outlook.com"),
];

/// Multi-word spellings of `@`; must be replaced before single words
static AT_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bat\s+the\s+rate(?:\s+of)?\b|एट\s+द\s+रेट(?:\s+ऑफ)?").unwrap()
});

/// Characters dropped from the final address
const STRIPPED: &[char] = &['!', '?', ',', ';'];

fn spoken_word(token: &str) -> &str {
    match token {
        "at" | "एट" => "@",
        "dot" | "डॉट" | "डोट" => ".",
        "underscore" | "अंडरस्कोर" => "_",
        other => other,
    }
}

fn provider_domain(text: &str) -> Option<(&'static str, &'static str)> {
    PROVIDERS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .copied()
}

/// Turn a spoken email address into `local@domain` form
///
/// Separator words are replaced only as whole words, so "cat" or "dotty"
/// inside a name are left alone. Applying the function to its own output
/// returns the same string.
///
/// # Examples
/// ```
/// use call_agent_text_processing::format_email;
/// assert_eq!(format_email("Ram Kumar at the rate gmail dot com"), "ramkumar@gmail.com");
/// assert_eq!(format_email("ram gmail"), "ram@gmail.com");
/// assert_eq!(format_email("cat at yahoo dot com"), "cat@yahoo.com");
/// ```
pub fn format_email(spoken: &str) -> String {
    let lower = spoken.trim().to_lowercase();
    if lower.is_empty() {
        return String::new();
    }

    let provider = provider_domain(&lower);
    let replaced = AT_PHRASE.replace_all(&lower, " @ ");

    // A single token is already collapsed; mapping it again would turn a
    // joined "a t" into "@" on the second pass
    let tokens: Vec<&str> = replaced.split_whitespace().collect();
    let spoken = tokens.len() > 1;

    let mut email: String = tokens
        .iter()
        .map(|&token| if spoken { spoken_word(token) } else { token })
        .collect::<String>()
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .collect();

    while email.ends_with('.') {
        email.pop();
    }

    match (email.find('@'), provider) {
        (None, Some((keyword, domain))) => {
            // "ramgmail" or "ramgmail.com": the keyword was the domain
            let local = email
                .strip_suffix(domain)
                .or_else(|| email.strip_suffix(keyword))
                .unwrap_or(&email)
                .trim_end_matches('.');
            if local.is_empty() {
                email
            } else {
                format!("{}@{}", local, domain)
            }
        }
        (Some(at), Some((keyword, domain))) if &email[at + 1..] == keyword => {
            format!("{}@{}", &email[..at], domain)
        }
        _ => email,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spoken_separators() {
        assert_eq!(format_email("ram at gmail dot com"), "ram@gmail.com");
        assert_eq!(format_email("RAM AT THE RATE YAHOO DOT COM"), "ram@yahoo.com");
        assert_eq!(format_email("ram एट द रेट gmail डॉट com"), "ram@gmail.com");
        assert_eq!(format_email("ram एट hotmail डॉट com"), "ram@hotmail.com");
    }

    #[test]
    fn test_words_containing_separators_are_kept() {
        assert_eq!(format_email("kat at gmail dot com"), "kat@gmail.com");
        assert_eq!(format_email("dotson at example dot org"), "dotson@example.org");
    }

    #[test]
    fn test_provider_fallback_domain() {
        assert_eq!(format_email("ram gmail"), "ram@gmail.com");
        assert_eq!(format_email("ram gmail dot com"), "ram@gmail.com");
        assert_eq!(format_email("ram at gmail"), "ram@gmail.com");
        assert_eq!(format_email("ram kumar"), "ramkumar");
    }

    #[test]
    fn test_punctuation_and_trailing_period() {
        assert_eq!(format_email("ram, at gmail dot com!"), "ram@gmail.com");
        assert_eq!(format_email("ram@gmail.com."), "ram@gmail.com");
    }

    #[test]
    fn test_single_token_is_not_remapped() {
        assert_eq!(format_email("a t"), "at");
        assert_eq!(format_email("at"), "at");
        assert_eq!(format_email("d o t"), "dot");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format_email(""), "");
        assert_eq!(format_email("   "), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "ram at gmail dot com",
            "Ram Kumar at the rate gmail dot com",
            "ram gmail",
            "ram at gmail",
            "cat at yahoo dot co dot in",
            "ram kumar",
            "priya एट द रेट outlook डॉट com",
            "gmail",
            "a t",
            "d o t",
            "ram d o t kumar",
            "",
        ];
        for input in inputs {
            let once = format_email(input);
            assert_eq!(format_email(&once), once, "not idempotent for {:?}", input);
        }
    }
}
