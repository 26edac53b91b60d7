use axum::http::header;
use axum::response::{IntoResponse, Response};

/// Neural voice used for every spoken line.
pub const VOICE: &str = "Google.en-US-Neural2-F";
pub const LANGUAGE: &str = "en-US";

/// Builder for the provider voice markup returned by every call webhook.
/// Verbs are emitted in call order; spoken text is XML-escaped here, and the
/// controller scrubs assistant output of formatting characters before it
/// ever reaches [`VoiceResponse::say`].
#[derive(Debug, Default)]
pub struct VoiceResponse {
    verbs: String,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, text: &str) -> Self {
        self.verbs.push_str(&format!(
            r#"<Say voice="{}" language="{}">{}</Say>"#,
            VOICE,
            LANGUAGE,
            xml_escape(text)
        ));
        self
    }

    /// Open a speech capture that posts the transcription to `action`.
    /// `timeout` bounds the wait for the caller to start speaking; the
    /// provider falls through to the next verb when it expires.
    pub fn gather_speech(mut self, action: &str, timeout: Option<u32>) -> Self {
        let timeout_attr = timeout
            .map(|t| format!(r#" timeout="{t}""#))
            .unwrap_or_default();
        self.verbs.push_str(&format!(
            r#"<Gather input="speech" action="{}" speechTimeout="auto" language="{}"{}/>"#,
            xml_escape(action),
            LANGUAGE,
            timeout_attr
        ));
        self
    }

    pub fn redirect(mut self, url: &str) -> Self {
        self.verbs
            .push_str(&format!("<Redirect>{}</Redirect>", xml_escape(url)));
        self
    }

    pub fn hangup(mut self) -> Self {
        self.verbs.push_str("<Hangup/>");
        self
    }

    pub fn into_xml(self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Response>{}</Response>"#,
            self.verbs
        )
    }
}

impl IntoResponse for VoiceResponse {
    fn into_response(self) -> Response {
        (
            [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
            self.into_xml(),
        )
            .into_response()
    }
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_response_is_a_bare_document() {
        assert_eq!(
            VoiceResponse::new().into_xml(),
            r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#
        );
    }

    #[test]
    fn say_escapes_spoken_text() {
        let xml = VoiceResponse::new().say("Tom & Jerry <3").into_xml();
        assert!(xml.contains("Tom &amp; Jerry &lt;3"));
        assert!(xml.contains(&format!(r#"voice="{VOICE}""#)));
    }

    #[test]
    fn gather_carries_action_and_optional_timeout() {
        let xml = VoiceResponse::new()
            .gather_speech("https://example.com/process_speech", Some(8))
            .into_xml();
        assert!(xml.contains(r#"input="speech""#));
        assert!(xml.contains(r#"action="https://example.com/process_speech""#));
        assert!(xml.contains(r#"speechTimeout="auto""#));
        assert!(xml.contains(r#"timeout="8""#));

        let xml = VoiceResponse::new().gather_speech("/process_speech", None).into_xml();
        assert!(!xml.contains("timeout="));
    }

    #[test]
    fn verbs_appear_in_call_order() {
        let xml = VoiceResponse::new()
            .say("Hello")
            .redirect("/voice")
            .hangup()
            .into_xml();
        let say = xml.find("<Say").unwrap();
        let redirect = xml.find("<Redirect>").unwrap();
        let hangup = xml.find("<Hangup/>").unwrap();
        assert!(say < redirect && redirect < hangup);
    }
}
