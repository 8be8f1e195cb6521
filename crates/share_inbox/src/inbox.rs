//! Idempotent acceptance of incoming shares.

use serde::{Deserialize, Serialize};
use share_contract::{resolve_effective_input, EffectiveShareInput, SharePayload};

/// Window within which an identical effective input is treated as a repeat delivery.
pub const DUPLICATE_WINDOW_MS: u64 = 2_000;

/// Channel a share arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShareSource {
    /// Message relayed by the background agent while the page was running.
    LiveMessage,
    /// Durable slot written before the page was ready.
    PendingSlot,
    /// Query parameters of the page URL.
    QueryParams,
}

/// A share the page should act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedShare {
    /// Payload as received.
    pub payload: SharePayload,
    /// What to act on.
    pub input: EffectiveShareInput,
    /// Channel it arrived through.
    pub source: ShareSource,
    /// Acceptance time.
    pub received_at_unix_ms: u64,
}

/// Accepts each distinct share once, no matter how many channels or listener invocations
/// report it.
#[derive(Debug, Clone, Default)]
pub struct ShareInbox {
    last: Option<(EffectiveShareInput, u64)>,
    accepted: u64,
}

impl ShareInbox {
    /// Accepts `payload` unless it is blank or repeats the previous input within
    /// [`DUPLICATE_WINDOW_MS`].
    pub fn accept(
        &mut self,
        payload: SharePayload,
        source: ShareSource,
        now_unix_ms: u64,
    ) -> Option<AcceptedShare> {
        let input = resolve_effective_input(&payload)?;
        if let Some((previous, at)) = &self.last {
            if *previous == input && now_unix_ms.saturating_sub(*at) < DUPLICATE_WINDOW_MS {
                return None;
            }
        }
        self.last = Some((input.clone(), now_unix_ms));
        self.accepted += 1;
        Some(AcceptedShare {
            payload,
            input,
            source,
            received_at_unix_ms: now_unix_ms,
        })
    }

    /// Number of shares accepted so far.
    pub fn accepted_count(&self) -> u64 {
        self.accepted
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn url_share(url: &str) -> SharePayload {
        SharePayload::new("", "", url)
    }

    #[test]
    fn duplicate_invocation_updates_state_once() {
        let mut inbox = ShareInbox::default();
        let first = inbox.accept(url_share("https://a.co"), ShareSource::LiveMessage, 1_000);
        let repeat = inbox.accept(url_share("https://a.co"), ShareSource::LiveMessage, 1_010);
        assert!(first.is_some());
        assert_eq!(repeat, None);
        assert_eq!(inbox.accepted_count(), 1);
    }

    #[test]
    fn same_input_across_channels_is_deduplicated() {
        let mut inbox = ShareInbox::default();
        let live = SharePayload::new("Title", "see https://a.co", "");
        let slot = url_share("https://a.co");
        assert!(inbox.accept(live, ShareSource::LiveMessage, 0).is_some());
        assert_eq!(inbox.accept(slot, ShareSource::PendingSlot, 500), None);
    }

    #[test]
    fn repeat_after_window_or_different_input_is_accepted() {
        let mut inbox = ShareInbox::default();
        assert!(inbox.accept(url_share("https://a.co"), ShareSource::QueryParams, 0).is_some());
        assert!(inbox
            .accept(url_share("https://b.co"), ShareSource::QueryParams, 10)
            .is_some());
        let later = inbox
            .accept(url_share("https://b.co"), ShareSource::LiveMessage, 10 + DUPLICATE_WINDOW_MS)
            .expect("outside window");
        assert_eq!(later.input, EffectiveShareInput::Url("https://b.co".to_string()));
        assert_eq!(later.source, ShareSource::LiveMessage);
    }

    #[test]
    fn blank_payload_is_never_accepted() {
        let mut inbox = ShareInbox::default();
        assert_eq!(
            inbox.accept(SharePayload::new("Only title", "", ""), ShareSource::LiveMessage, 0),
            None
        );
        assert_eq!(inbox.accepted_count(), 0);
    }
}
