//! TwiML voice responses
//!
//! A webhook answers with one [`VoiceResponse`]: an ordered list of verbs the
//! platform executes top to bottom. A `<Redirect>` placed after a `<Gather>`
//! only runs when the gather times out without speech, which is how every
//! step gets its silence fallback.

use std::fmt::Write;

/// Content type of a rendered response
pub const TWIML_CONTENT_TYPE: &str = "application/xml";

/// HTTP method the platform uses for `action` and redirect URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Text spoken with text-to-speech
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Say {
    pub text: String,
    pub voice: Option<String>,
    pub language: Option<String>,
    /// SSML prosody rate (`fast`, `slow`, `120%`)
    pub rate: Option<String>,
}

impl Say {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            language: None,
            rate: None,
        }
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn rate(mut self, rate: Option<&str>) -> Self {
        self.rate = rate.filter(|r| !r.is_empty()).map(str::to_string);
        self
    }
}

/// Speech collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gather {
    pub prompts: Vec<Say>,
    /// URL the recognized speech is posted to
    pub action: String,
    pub method: HttpMethod,
    /// Seconds of silence before giving up
    pub timeout_secs: u32,
    pub language: Option<String>,
}

impl Gather {
    pub fn speech(action: impl Into<String>, timeout_secs: u32) -> Self {
        Self {
            prompts: Vec::new(),
            action: action.into(),
            method: HttpMethod::Post,
            timeout_secs,
            language: None,
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn say(mut self, say: Say) -> Self {
        self.prompts.push(say);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Say(Say),
    Gather(Gather),
    Redirect { url: String, method: HttpMethod },
    Hangup,
}

/// Ordered list of verbs returned from a webhook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, say: Say) -> Self {
        self.verbs.push(Verb::Say(say));
        self
    }

    pub fn gather(mut self, gather: Gather) -> Self {
        self.verbs.push(Verb::Gather(gather));
        self
    }

    pub fn redirect(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(Verb::Redirect {
            url: url.into(),
            method: HttpMethod::Post,
        });
        self
    }

    pub fn hangup(mut self) -> Self {
        self.verbs.push(Verb::Hangup);
        self
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    pub fn ends_with_hangup(&self) -> bool {
        matches!(self.verbs.last(), Some(Verb::Hangup))
    }

    /// Redirect target, if the response has one
    pub fn redirect_url(&self) -> Option<&str> {
        self.verbs.iter().find_map(|v| match v {
            Verb::Redirect { url, .. } => Some(url.as_str()),
            _ => None,
        })
    }

    /// Action of the first gather, if any
    pub fn gather_action(&self) -> Option<&str> {
        self.verbs.iter().find_map(|v| match v {
            Verb::Gather(g) => Some(g.action.as_str()),
            _ => None,
        })
    }

    /// Every spoken line, including gather prompts, in playback order
    pub fn spoken_text(&self) -> Vec<&str> {
        let mut lines = Vec::new();
        for verb in &self.verbs {
            match verb {
                Verb::Say(say) => lines.push(say.text.as_str()),
                Verb::Gather(gather) => lines.extend(gather.prompts.iter().map(|s| s.text.as_str())),
                _ => {}
            }
        }
        lines
    }

    /// Render as a TwiML document
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>");
        for verb in &self.verbs {
            match verb {
                Verb::Say(say) => write_say(&mut xml, say),
                Verb::Gather(gather) => {
                    let _ = write!(
                        xml,
                        "<Gather input=\"speech\" action=\"{}\" method=\"{}\" timeout=\"{}\"",
                        escape_xml(&gather.action),
                        gather.method.as_str(),
                        gather.timeout_secs
                    );
                    if let Some(language) = &gather.language {
                        let _ = write!(xml, " language=\"{}\"", escape_xml(language));
                    }
                    xml.push('>');
                    for say in &gather.prompts {
                        write_say(&mut xml, say);
                    }
                    xml.push_str("</Gather>");
                }
                Verb::Redirect { url, method } => {
                    let _ = write!(
                        xml,
                        "<Redirect method=\"{}\">{}</Redirect>",
                        method.as_str(),
                        escape_xml(url)
                    );
                }
                Verb::Hangup => xml.push_str("<Hangup/>"),
            }
        }
        xml.push_str("</Response>");
        xml
    }
}

fn write_say(xml: &mut String, say: &Say) {
    xml.push_str("<Say");
    if let Some(voice) = &say.voice {
        let _ = write!(xml, " voice=\"{}\"", escape_xml(voice));
    }
    if let Some(language) = &say.language {
        let _ = write!(xml, " language=\"{}\"", escape_xml(language));
    }
    xml.push('>');
    match &say.rate {
        Some(rate) => {
            let _ = write!(
                xml,
                "<prosody rate=\"{}\">{}</prosody>",
                escape_xml(rate),
                escape_xml(&say.text)
            );
        }
        None => xml.push_str(&escape_xml(&say.text)),
    }
    xml.push_str("</Say>");
}

/// Escape text for element content and attribute values
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hindi(text: &str) -> Say {
        Say::new(text)
            .voice("Polly.Aditi")
            .language("hi-IN")
            .rate(Some("fast"))
    }

    #[test]
    fn test_gather_with_fallback_redirect() {
        let response = VoiceResponse::new()
            .gather(
                Gather::speech("/handle-name?v=1&attempt=1", 5)
                    .language("hi-IN")
                    .say(hindi("कृपया अपना नाम बताइए।")),
            )
            .redirect("/handle-name?v=1&attempt=1");

        assert_eq!(
            response.to_xml(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>\
             <Gather input=\"speech\" action=\"/handle-name?v=1&amp;attempt=1\" method=\"POST\" timeout=\"5\" language=\"hi-IN\">\
             <Say voice=\"Polly.Aditi\" language=\"hi-IN\"><prosody rate=\"fast\">कृपया अपना नाम बताइए।</prosody></Say>\
             </Gather>\
             <Redirect method=\"POST\">/handle-name?v=1&amp;attempt=1</Redirect>\
             </Response>"
        );
        assert_eq!(response.gather_action(), Some("/handle-name?v=1&attempt=1"));
        assert!(!response.ends_with_hangup());
    }

    #[test]
    fn test_plain_say_and_hangup() {
        let response = VoiceResponse::new()
            .say(Say::new("Sorry, there was an error with the application."))
            .hangup();
        let xml = response.to_xml();
        assert!(xml.contains("<Say>Sorry, there was an error with the application.</Say><Hangup/>"));
        assert!(response.ends_with_hangup());
    }

    #[test]
    fn test_spoken_text_is_escaped() {
        let xml = VoiceResponse::new()
            .say(Say::new("Tom & Jerry <3"))
            .to_xml();
        assert!(xml.contains("Tom &amp; Jerry &lt;3"));
    }

    #[test]
    fn test_empty_rate_is_ignored() {
        let say = Say::new("hi").rate(Some(""));
        assert_eq!(say.rate, None);
    }

    #[test]
    fn test_spoken_text_order() {
        let response = VoiceResponse::new()
            .say(hindi("one"))
            .gather(Gather::speech("/x", 5).say(hindi("two")))
            .redirect("/y");
        assert_eq!(response.spoken_text(), vec!["one", "two"]);
        assert_eq!(response.redirect_url(), Some("/y"));
    }
}
