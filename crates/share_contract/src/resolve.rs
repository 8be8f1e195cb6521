//! Effective-input resolution for received shares.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::SharePayload;

fn http_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://[^\s]+").expect("valid http url pattern"))
}

/// Returns the first `http://` or `https://` run of non-whitespace characters in `text`.
///
/// No validation happens beyond the scheme prefix.
pub fn extract_first_http_url(text: &str) -> Option<&str> {
    http_url_pattern().find(text).map(|m| m.as_str())
}

/// What the application should act on for a received share.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EffectiveShareInput {
    /// A URL, either shared directly or found inside the shared text.
    Url(String),
    /// Shared text with no embedded URL.
    Text(String),
}

impl EffectiveShareInput {
    /// Borrowed input string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Url(value) | Self::Text(value) => value,
        }
    }

    /// Returns whether the input is a URL.
    pub const fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

/// Resolves what to act on: the `url` field when present, else the first URL embedded in
/// `text`, else the raw `text`. Blank payloads resolve to nothing.
pub fn resolve_effective_input(payload: &SharePayload) -> Option<EffectiveShareInput> {
    if !payload.url.is_empty() {
        return Some(EffectiveShareInput::Url(payload.url.clone()));
    }
    if payload.text.is_empty() {
        return None;
    }
    Some(match extract_first_http_url(&payload.text) {
        Some(found) => EffectiveShareInput::Url(found.to_string()),
        None => EffectiveShareInput::Text(payload.text.clone()),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn first_embedded_url_wins() {
        assert_eq!(
            extract_first_http_url("see http://one.test/a and https://two.test/b"),
            Some("http://one.test/a")
        );
        assert_eq!(extract_first_http_url("ftp://nope.test"), None);
        assert_eq!(extract_first_http_url("just some words"), None);
    }

    #[test]
    fn url_field_beats_text() {
        let payload = SharePayload::new("", "read https://text.test", "https://field.test");
        assert_eq!(
            resolve_effective_input(&payload),
            Some(EffectiveShareInput::Url("https://field.test".to_string()))
        );
    }

    #[test]
    fn text_with_embedded_url_resolves_to_that_url() {
        let payload = SharePayload::new("", "Check this out https://a.co/d/xyz", "");
        let input = resolve_effective_input(&payload).expect("input");
        assert!(input.is_url());
        assert_eq!(input.as_str(), "https://a.co/d/xyz");
    }

    #[test]
    fn plain_text_resolves_to_itself() {
        let payload = SharePayload::new("", "just some words", "");
        assert_eq!(
            resolve_effective_input(&payload),
            Some(EffectiveShareInput::Text("just some words".to_string()))
        );
    }

    #[test]
    fn blank_payload_resolves_to_nothing() {
        assert_eq!(resolve_effective_input(&SharePayload::new("Only title", "", "")), None);
    }
}
