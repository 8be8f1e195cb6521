//! Share payload value object.

use serde::{Deserialize, Deserializer, Serialize};

/// Title/text/URL triple handed over by a sharing application.
///
/// Every field defaults to an empty string. A payload carries no identity of its own;
/// consumers decide what counts as a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SharePayload {
    /// Shared title.
    #[serde(deserialize_with = "string_or_empty")]
    pub title: String,
    /// Shared free text, which may embed a URL.
    #[serde(deserialize_with = "string_or_empty")]
    pub text: String,
    /// Shared URL, unvalidated.
    #[serde(deserialize_with = "string_or_empty")]
    pub url: String,
}

impl SharePayload {
    /// Builds a payload from its three fields.
    pub fn new(title: impl Into<String>, text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            url: url.into(),
        }
    }

    /// Returns whether neither text nor URL carries anything to act on.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && self.url.is_empty()
    }
}

/// Accepts `null` where a string is expected and maps it to `""`.
fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_and_null_fields_default_to_empty() {
        let payload: SharePayload =
            serde_json::from_value(json!({ "url": "https://example.com", "text": null }))
                .expect("payload");
        assert_eq!(payload, SharePayload::new("", "", "https://example.com"));
        assert!(!payload.is_blank());
        assert!(SharePayload::default().is_blank());
    }
}
