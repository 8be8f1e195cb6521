//! Typed host-domain contracts shared by the background agent and the foreground application.
//!
//! This crate is the API-first boundary for platform services: the versioned asset cache,
//! network transport, window clients, lifecycle hooks, timers, and durable slots. Browser
//! adapters live in `platform_host_web`; the in-memory adapters here back native builds and
//! tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod cache;
pub mod clients;
pub mod fetch;
pub mod host;
pub mod storage;
pub mod time;
pub mod worker;

pub use cache::{
    normalize_request_url, AssetCacheFuture, AssetCacheStore, CacheHandle, MemoryAssetCache,
    NoopAssetCache, RequestIdentity,
};
pub use clients::{ClientFuture, ClientId, ClientInfo, ClientRegistry, MemoryClientRegistry};
pub use fetch::network::{MemoryNetwork, NetworkFetcher, NetworkFuture};
pub use fetch::types::{
    FetchRequest, FetchResponse, StoredResponse, METHOD_GET, STATUS_FOUND, STATUS_OK,
};
pub use host::{AgentHostServices, MemoryAgentHost};
pub use storage::slots::{
    take_slot_with, DurableSlotStore, MemorySlotStore, SlotStoreFuture, SHARED_TEXT_SLOT,
    SHARED_URL_SLOT,
};
pub use time::{unix_time_ms_now, DelayTimer, MemoryDelayTimer, TimerFuture};
pub use worker::{MemoryWorkerControl, WorkerControl, WorkerControlFuture};
