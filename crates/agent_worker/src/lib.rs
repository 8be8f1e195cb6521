//! Service-worker entrypoint hosting the offline agent.
//!
//! Built as a `cdylib` for `wasm32` with `wasm-bindgen --target no-modules`. Browsers only
//! honor event listeners attached while the worker script first evaluates, which happens
//! before the module can load, so `sw.js` attaches them and forwards each event to the
//! handlers exported here. The routing decisions in [`scope`] are plain functions shared
//! with native tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod scope;
#[cfg(target_arch = "wasm32")]
mod worker;

pub use scope::{
    is_interceptable, load_config, redirect_target, resume_phase, RegistrationSlots,
    BUNDLED_CONFIG,
};
#[cfg(target_arch = "wasm32")]
pub use worker::{on_fetch, on_message, respond_late, run_activate, run_install};

/// Installs the panic hook and builds the agent before the loader forwards any event.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    console_error_panic_hook::set_once();
    worker::start()
}
