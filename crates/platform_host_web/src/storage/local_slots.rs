//! `localStorage`-backed durable slot store.
//!
//! Slots are plain strings under their own key, so a value written by one page load can be
//! taken by the next one.

use platform_host::{DurableSlotStore, SlotStoreFuture};

#[derive(Debug, Clone, Copy, Default)]
/// Browser slot store backed by `window.localStorage`.
pub struct WebSlotStore;

impl WebSlotStore {
    /// Reads a slot synchronously.
    pub fn load(self, slot: &str) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()?.local_storage().ok().flatten()?;
            storage.get_item(slot).ok().flatten()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = slot;
            None
        }
    }

    /// Writes a slot synchronously.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable or the write fails.
    pub fn save(self, slot: &str, value: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or_else(|| "localStorage unavailable".to_string())?;
            storage
                .set_item(slot, value)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (slot, value);
            Ok(())
        }
    }

    /// Clears a slot synchronously.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable or the delete fails.
    pub fn clear(self, slot: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or_else(|| "localStorage unavailable".to_string())?;
            storage
                .remove_item(slot)
                .map_err(|e| format!("localStorage remove_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = slot;
            Ok(())
        }
    }
}

impl DurableSlotStore for WebSlotStore {
    fn load_slot<'a>(
        &'a self,
        slot: &'a str,
    ) -> SlotStoreFuture<'a, Result<Option<String>, String>> {
        let store = *self;
        Box::pin(async move { Ok(store.load(slot)) })
    }

    fn save_slot<'a>(
        &'a self,
        slot: &'a str,
        value: &'a str,
    ) -> SlotStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.save(slot, value) })
    }

    fn clear_slot<'a>(&'a self, slot: &'a str) -> SlotStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.clear(slot) })
    }
}
