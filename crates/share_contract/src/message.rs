//! Messages exchanged between the background agent and foreground windows.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SharePayload;

/// `type` discriminant of a share delivery.
pub const SHARE_TARGET_MESSAGE_TYPE: &str = "SHARE_TARGET";

/// `type` discriminant of a foreground readiness signal.
pub const SHARE_READY_MESSAGE_TYPE: &str = "SHARE_READY";

/// Wire message of the share relay.
///
/// Serialized as an internally tagged object, for example
/// `{ "type": "SHARE_TARGET", "title": "", "text": "", "url": "https://…" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RelayMessage {
    /// Agent → foreground: a share to display.
    #[serde(rename = "SHARE_TARGET")]
    ShareTarget(SharePayload),
    /// Foreground → agent: the sender's message listener is attached.
    #[serde(rename = "SHARE_READY")]
    ClientReady,
}

impl RelayMessage {
    /// Returns the wire discriminant.
    pub const fn message_type(&self) -> &'static str {
        match self {
            Self::ShareTarget(_) => SHARE_TARGET_MESSAGE_TYPE,
            Self::ClientReady => SHARE_READY_MESSAGE_TYPE,
        }
    }

    /// Serializes the message into its JSON wire shape.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn to_value(&self) -> Result<Value, String> {
        serde_json::to_value(self).map_err(|e| e.to_string())
    }

    /// Parses a wire message, returning `None` for foreign or malformed messages.
    pub fn from_value(value: &Value) -> Option<Self> {
        let message_type = value.get("type")?.as_str()?;
        if message_type != SHARE_TARGET_MESSAGE_TYPE && message_type != SHARE_READY_MESSAGE_TYPE {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Returns the payload of a [`RelayMessage::ShareTarget`].
    pub fn into_share_payload(self) -> Option<SharePayload> {
        match self {
            Self::ShareTarget(payload) => Some(payload),
            Self::ClientReady => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn share_target_wire_shape_is_flat_and_tagged() {
        let message = RelayMessage::ShareTarget(SharePayload::new("Foo", "", "https://a.co"));
        assert_eq!(
            message.to_value().expect("serialize"),
            json!({ "type": "SHARE_TARGET", "title": "Foo", "text": "", "url": "https://a.co" })
        );
        assert_eq!(
            RelayMessage::ClientReady.to_value().expect("serialize"),
            json!({ "type": "SHARE_READY" })
        );
    }

    #[test]
    fn foreign_messages_are_ignored() {
        assert_eq!(RelayMessage::from_value(&json!({ "type": "SKIP_WAITING" })), None);
        assert_eq!(RelayMessage::from_value(&json!("SHARE_TARGET")), None);
        assert_eq!(RelayMessage::from_value(&json!({ "url": "https://a.co" })), None);
    }

    #[test]
    fn share_target_with_missing_fields_still_parses() {
        let parsed = RelayMessage::from_value(&json!({ "type": "SHARE_TARGET", "text": "hi" }))
            .and_then(RelayMessage::into_share_payload);
        assert_eq!(parsed, Some(SharePayload::new("", "hi", "")));
    }
}
