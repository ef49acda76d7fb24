//! Language definitions
//!
//! The call agent speaks Hindi by default and translates caller input to
//! English before it reaches the answer engine or the profile sinks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Hindi,
    English,
    Marathi,
    Tamil,
    Bengali,
}

impl Language {
    /// ISO 639-1 code, as used by translation services
    pub fn code(&self) -> &'static str {
        match self {
            Self::Hindi => "hi",
            Self::English => "en",
            Self::Marathi => "mr",
            Self::Tamil => "ta",
            Self::Bengali => "bn",
        }
    }

    /// BCP-47 locale tag used for speech recognition and synthesis
    pub fn locale(&self) -> &'static str {
        match self {
            Self::Hindi => "hi-IN",
            Self::English => "en-IN",
            Self::Marathi => "mr-IN",
            Self::Tamil => "ta-IN",
            Self::Bengali => "bn-IN",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hindi => "Hindi",
            Self::English => "English",
            Self::Marathi => "Marathi",
            Self::Tamil => "Tamil",
            Self::Bengali => "Bengali",
        }
    }

    /// Look up a language by ISO code or locale tag (`hi`, `hi-IN`, `en_US`)
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "hi" => Some(Self::Hindi),
            "en" => Some(Self::English),
            "mr" => Some(Self::Marathi),
            "ta" => Some(Self::Tamil),
            "bn" => Some(Self::Bengali),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
            .ok_or_else(|| crate::Error::InvalidInput(format!("unsupported language: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_and_code() {
        assert_eq!(Language::Hindi.locale(), "hi-IN");
        assert_eq!(Language::English.code(), "en");
    }

    #[test]
    fn test_from_code_accepts_locales() {
        assert_eq!(Language::from_code("hi-IN"), Some(Language::Hindi));
        assert_eq!(Language::from_code("en_US"), Some(Language::English));
        assert_eq!(Language::from_code("xx"), None);
        assert!("fr".parse::<Language>().is_err());
    }
}
