//! Durable string-slot storage used to hand a share across page loads.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

/// Object-safe boxed future used by [`DurableSlotStore`] async methods.
pub type SlotStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Slot holding a shared URL that has not been consumed yet.
pub const SHARED_URL_SLOT: &str = "sharedUrl";

/// Slot holding shared text that has not been consumed yet.
pub const SHARED_TEXT_SLOT: &str = "sharedText";

/// Host service for small string values that survive a page reload.
pub trait DurableSlotStore {
    /// Reads a slot.
    fn load_slot<'a>(
        &'a self,
        slot: &'a str,
    ) -> SlotStoreFuture<'a, Result<Option<String>, String>>;

    /// Writes a slot, replacing any previous value.
    fn save_slot<'a>(
        &'a self,
        slot: &'a str,
        value: &'a str,
    ) -> SlotStoreFuture<'a, Result<(), String>>;

    /// Clears a slot. Clearing an empty slot succeeds.
    fn clear_slot<'a>(&'a self, slot: &'a str) -> SlotStoreFuture<'a, Result<(), String>>;
}

/// Reads and clears a slot so its value is consumed at most once.
///
/// Empty strings are treated as absent.
///
/// # Errors
///
/// Returns an error when the store read or clear fails. A failed clear still reports the
/// error so callers do not consume a value that would be read again on the next load.
pub async fn take_slot_with<S: DurableSlotStore + ?Sized>(
    store: &S,
    slot: &str,
) -> Result<Option<String>, String> {
    let value = store.load_slot(slot).await?;
    if value.is_some() {
        store.clear_slot(slot).await?;
    }
    Ok(value.filter(|v| !v.is_empty()))
}

#[derive(Debug, Clone, Default)]
/// In-memory slot store keyed by slot name.
pub struct MemorySlotStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl DurableSlotStore for MemorySlotStore {
    fn load_slot<'a>(
        &'a self,
        slot: &'a str,
    ) -> SlotStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move { Ok(self.inner.borrow().get(slot).cloned()) })
    }

    fn save_slot<'a>(
        &'a self,
        slot: &'a str,
        value: &'a str,
    ) -> SlotStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner
                .borrow_mut()
                .insert(slot.to_string(), value.to_string());
            Ok(())
        })
    }

    fn clear_slot<'a>(&'a self, slot: &'a str) -> SlotStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner.borrow_mut().remove(slot);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn take_slot_consumes_value_once() {
        let store = MemorySlotStore::default();
        block_on(store.save_slot(SHARED_URL_SLOT, "https://example.com")).expect("save");

        assert_eq!(
            block_on(take_slot_with(&store, SHARED_URL_SLOT)).expect("take"),
            Some("https://example.com".to_string())
        );
        assert_eq!(block_on(take_slot_with(&store, SHARED_URL_SLOT)).expect("take"), None);
    }

    #[test]
    fn take_slot_treats_empty_value_as_absent_and_clears_it() {
        let store = MemorySlotStore::default();
        block_on(store.save_slot(SHARED_TEXT_SLOT, "")).expect("save");

        assert_eq!(block_on(take_slot_with(&store, SHARED_TEXT_SLOT)).expect("take"), None);
        assert_eq!(block_on(store.load_slot(SHARED_TEXT_SLOT)).expect("load"), None);
    }
}
