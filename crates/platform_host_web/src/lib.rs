//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! Agent-side adapters cover Cache Storage, `fetch`, window clients, worker lifecycle hooks,
//! and timers. Page-side bindings in [`foreground`] cover agent registration and messaging,
//! `localStorage` slots, and location helpers. Non-`wasm32` builds compile inert fallbacks.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod adapters;
pub mod cache_storage;
pub mod clients;
pub mod foreground;
#[cfg(target_arch = "wasm32")]
mod interop;
pub mod network;
pub mod storage;
pub mod timer;
pub mod worker_control;

pub use adapters::{agent_host_services, slot_store};
pub use cache_storage::WebAssetCache;
pub use clients::WebClientRegistry;
pub use foreground::{
    agent_supported, is_framed, listen_for_agent_messages, page_allows_agent, page_location,
    post_to_agent, register_agent, replace_page_url, should_register, unregister_agent,
    PageLocation,
};
#[cfg(target_arch = "wasm32")]
pub use interop::{request_from_web, response_to_web};
pub use network::WebNetworkFetcher;
pub use storage::local_slots::WebSlotStore;
pub use timer::WebDelayTimer;
pub use worker_control::WebWorkerControl;
