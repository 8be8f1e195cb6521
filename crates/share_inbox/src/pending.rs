//! Durable pending-share handoff through the `sharedUrl`/`sharedText` slots.

use platform_host::{DurableSlotStore, SHARED_TEXT_SLOT, SHARED_URL_SLOT};
use share_contract::{resolve_effective_input, EffectiveShareInput, SharePayload};

/// Takes and clears both pending slots. Returns `None` when neither held a value.
///
/// Both slots are read before either is cleared, so a failed clear leaves the whole
/// pending share in place for the next mount.
///
/// # Errors
///
/// Returns an error when a slot cannot be read or cleared.
pub async fn take_pending_share<S: DurableSlotStore + ?Sized>(
    store: &S,
) -> Result<Option<SharePayload>, String> {
    let url = store.load_slot(SHARED_URL_SLOT).await?;
    let text = store.load_slot(SHARED_TEXT_SLOT).await?;
    for (slot, value) in [(SHARED_URL_SLOT, &url), (SHARED_TEXT_SLOT, &text)] {
        if value.is_some() {
            store.clear_slot(slot).await?;
        }
    }
    let payload = SharePayload {
        title: String::new(),
        text: text.unwrap_or_default(),
        url: url.unwrap_or_default(),
    };
    Ok((!payload.is_blank()).then_some(payload))
}

/// Stores the effective input of `payload` for the next page load: URLs go to
/// `sharedUrl`, plain text to `sharedText`. Returns whether anything was stored.
///
/// # Errors
///
/// Returns an error when the slot write fails.
pub async fn stash_pending_share<S: DurableSlotStore + ?Sized>(
    store: &S,
    payload: &SharePayload,
) -> Result<bool, String> {
    match resolve_effective_input(payload) {
        Some(EffectiveShareInput::Url(url)) => {
            store.save_slot(SHARED_URL_SLOT, &url).await?;
            Ok(true)
        }
        Some(EffectiveShareInput::Text(text)) => {
            store.save_slot(SHARED_TEXT_SLOT, &text).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use platform_host::{MemorySlotStore, SlotStoreFuture};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn stash_then_take_consumes_once() {
        let store = MemorySlotStore::default();
        let shared = SharePayload::new("", "Check this out https://a.co/d/xyz", "");
        assert_eq!(block_on(stash_pending_share(&store, &shared)), Ok(true));
        assert_eq!(
            block_on(store.load_slot(SHARED_URL_SLOT)).expect("load"),
            Some("https://a.co/d/xyz".to_string())
        );

        assert_eq!(
            block_on(take_pending_share(&store)),
            Ok(Some(SharePayload::new("", "", "https://a.co/d/xyz")))
        );
        assert_eq!(block_on(take_pending_share(&store)), Ok(None));
    }

    #[test]
    fn plain_text_goes_to_text_slot() {
        let store = MemorySlotStore::default();
        let shared = SharePayload::new("", "just some words", "");
        assert_eq!(block_on(stash_pending_share(&store, &shared)), Ok(true));
        assert_eq!(block_on(store.load_slot(SHARED_URL_SLOT)).expect("load"), None);
        assert_eq!(
            block_on(take_pending_share(&store)),
            Ok(Some(SharePayload::new("", "just some words", "")))
        );
    }

    /// Slot store whose clears fail for one slot.
    struct StuckSlot {
        inner: MemorySlotStore,
        stuck: &'static str,
    }

    impl DurableSlotStore for StuckSlot {
        fn load_slot<'a>(
            &'a self,
            slot: &'a str,
        ) -> SlotStoreFuture<'a, Result<Option<String>, String>> {
            self.inner.load_slot(slot)
        }

        fn save_slot<'a>(
            &'a self,
            slot: &'a str,
            value: &'a str,
        ) -> SlotStoreFuture<'a, Result<(), String>> {
            self.inner.save_slot(slot, value)
        }

        fn clear_slot<'a>(&'a self, slot: &'a str) -> SlotStoreFuture<'a, Result<(), String>> {
            if slot == self.stuck {
                Box::pin(async { Err("storage locked".to_string()) })
            } else {
                self.inner.clear_slot(slot)
            }
        }
    }

    #[test]
    fn failed_clear_keeps_the_pending_share() {
        let store = StuckSlot {
            inner: MemorySlotStore::default(),
            stuck: SHARED_URL_SLOT,
        };
        block_on(store.save_slot(SHARED_URL_SLOT, "https://a.co")).expect("seed url");
        block_on(store.save_slot(SHARED_TEXT_SLOT, "notes")).expect("seed text");

        assert_eq!(
            block_on(take_pending_share(&store)),
            Err("storage locked".to_string())
        );
        assert_eq!(
            block_on(store.load_slot(SHARED_URL_SLOT)).expect("load"),
            Some("https://a.co".to_string())
        );
        assert_eq!(
            block_on(store.load_slot(SHARED_TEXT_SLOT)).expect("load"),
            Some("notes".to_string())
        );
    }

    #[test]
    fn blank_payload_is_not_stashed() {
        let store = MemorySlotStore::default();
        assert_eq!(block_on(stash_pending_share(&store, &SharePayload::default())), Ok(false));
        assert_eq!(block_on(take_pending_share(&store)), Ok(None));
    }
}
