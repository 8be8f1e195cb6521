//! Mount-time share intake: pending slots first, then the page query.

use std::cell::RefCell;

use leptos::logging;
use platform_host::DurableSlotStore;

use crate::{
    share_from_search, strip_share_params, take_pending_share, AcceptedShare, ShareInbox,
    ShareSource,
};

/// Result of [`consume_on_mount`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MountOutcome {
    /// Shares accepted, oldest first.
    pub accepted: Vec<AcceptedShare>,
    /// URL to put in place of the current one so a reload does not replay the share.
    pub cleaned_url: Option<String>,
}

/// Drains the durable pending slots and the page query into `inbox`.
///
/// Slot failures are logged and treated as empty. The inbox is only borrowed after all
/// store reads complete, so live deliveries may run concurrently.
pub async fn consume_on_mount<S: DurableSlotStore + ?Sized>(
    inbox: &RefCell<ShareInbox>,
    store: &S,
    pathname: &str,
    search: &str,
    now_unix_ms: u64,
) -> MountOutcome {
    let pending = match take_pending_share(store).await {
        Ok(pending) => pending,
        Err(err) => {
            logging::warn!("reading pending share failed: {err}");
            None
        }
    };
    let from_query = share_from_search(search);

    let mut inbox = inbox.borrow_mut();
    let accepted = [
        pending.map(|payload| (payload, ShareSource::PendingSlot)),
        from_query.map(|payload| (payload, ShareSource::QueryParams)),
    ]
    .into_iter()
    .flatten()
    .filter_map(|(payload, source)| inbox.accept(payload, source, now_unix_ms))
    .collect();

    MountOutcome {
        accepted,
        cleaned_url: strip_share_params(pathname, search),
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use platform_host::{MemorySlotStore, SHARED_URL_SLOT};
    use pretty_assertions::assert_eq;
    use share_contract::{EffectiveShareInput, SharePayload};

    use super::*;

    #[test]
    fn pending_slot_is_consumed_and_query_is_cleaned() {
        let store = MemorySlotStore::default();
        block_on(store.save_slot(SHARED_URL_SLOT, "https://a.co")).expect("seed");
        let inbox = RefCell::new(ShareInbox::default());

        let outcome = block_on(consume_on_mount(
            &inbox,
            &store,
            "/",
            "?share-success=true",
            5_000,
        ));
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].source, ShareSource::PendingSlot);
        assert_eq!(
            outcome.accepted[0].input,
            EffectiveShareInput::Url("https://a.co".to_string())
        );
        assert_eq!(outcome.cleaned_url, Some("/".to_string()));

        let again = block_on(consume_on_mount(&inbox, &store, "/", "", 60_000));
        assert_eq!(again, MountOutcome::default());
    }

    #[test]
    fn same_share_in_slot_and_query_is_accepted_once() {
        let store = MemorySlotStore::default();
        block_on(store.save_slot(SHARED_URL_SLOT, "https://a.co")).expect("seed");
        let inbox = RefCell::new(ShareInbox::default());

        let outcome = block_on(consume_on_mount(
            &inbox,
            &store,
            "/",
            "?url=https%3A%2F%2Fa.co",
            0,
        ));
        assert_eq!(outcome.accepted.len(), 1);
    }

    #[test]
    fn query_share_without_pending_slot() {
        let store = MemorySlotStore::default();
        let inbox = RefCell::new(ShareInbox::default());
        let outcome = block_on(consume_on_mount(
            &inbox,
            &store,
            "/",
            "?text=just%20some%20words&lang=en",
            0,
        ));
        assert_eq!(
            outcome.accepted[0].payload,
            SharePayload::new("", "just some words", "")
        );
        assert_eq!(outcome.accepted[0].source, ShareSource::QueryParams);
        assert_eq!(outcome.cleaned_url, Some("/?lang=en".to_string()));
    }
}
