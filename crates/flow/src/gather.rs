//! Gather evaluation
//!
//! Every handler step starts by classifying the recognized speech with the
//! same three-way outcome, so retry limits live in one place.

/// How a step treats missing speech
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatherPolicy {
    pub max_attempts: u32,
    /// Required gathers retry until `max_attempts`; optional ones fall through at once
    pub required: bool,
}

impl GatherPolicy {
    pub fn required(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            required: true,
        }
    }

    pub fn optional() -> Self {
        Self {
            max_attempts: 1,
            required: false,
        }
    }

    pub fn evaluate(&self, speech: Option<&str>, attempt: u32) -> GatherOutcome {
        match speech.map(str::trim).filter(|s| !s.is_empty()) {
            Some(text) => GatherOutcome::Advance(text.to_string()),
            None if self.required && attempt < self.max_attempts => GatherOutcome::Retry {
                next_attempt: attempt.max(1) + 1,
            },
            None => GatherOutcome::FallThrough,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatherOutcome {
    /// Speech was recognized
    Advance(String),
    /// Nothing heard, ask again
    Retry { next_attempt: u32 },
    /// Nothing heard and no retries left (or the gather was optional)
    FallThrough,
}

impl GatherOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatherOutcome::Advance(_) => "advance",
            GatherOutcome::Retry { .. } => "retry",
            GatherOutcome::FallThrough => "fall_through",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_always_advances() {
        let policy = GatherPolicy::required(2);
        for attempt in [1, 2, 5] {
            assert_eq!(
                policy.evaluate(Some(" राम "), attempt),
                GatherOutcome::Advance("राम".to_string())
            );
        }
    }

    #[test]
    fn test_required_retries_then_falls_through() {
        let policy = GatherPolicy::required(2);
        assert_eq!(policy.evaluate(None, 1), GatherOutcome::Retry { next_attempt: 2 });
        assert_eq!(policy.evaluate(Some("   "), 1), GatherOutcome::Retry { next_attempt: 2 });
        assert_eq!(policy.evaluate(None, 2), GatherOutcome::FallThrough);
        assert_eq!(policy.evaluate(None, 3), GatherOutcome::FallThrough);
    }

    #[test]
    fn test_optional_never_retries() {
        assert_eq!(GatherPolicy::optional().evaluate(Some(""), 1), GatherOutcome::FallThrough);
    }

    #[test]
    fn test_single_attempt_policy() {
        assert_eq!(GatherPolicy::required(1).evaluate(None, 1), GatherOutcome::FallThrough);
    }
}
