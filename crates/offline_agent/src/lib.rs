//! Offline-first background agent with share-target relaying.
//!
//! The agent precaches the application shell into a versioned cache generation, answers
//! requests cache-first once active, and turns share-target requests into a redirect plus a
//! message delivered to a foreground window. Host capabilities arrive through
//! [`platform_host::AgentHostServices`], so the same agent runs against browser adapters and
//! the in-memory adapters used by tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod agent;
pub mod cache_policy;
pub mod config;
mod error;
pub mod lifecycle;
mod response;
pub mod router;

pub use agent::{ActivationReport, FetchRoute, InstallReport, OfflineAgent};
pub use cache_policy::CacheFirstPolicy;
pub use config::{
    AgentConfig, ConfigError, DeliveryMode, DEFAULT_DELIVERY_DELAY_MS, DEFAULT_GENERATION_ID,
    DEFAULT_PRECACHE_MANIFEST, DEFAULT_READY_TIMEOUT_MS, DEFAULT_SHARE_ENTRY_URL,
    DEFAULT_SHARE_SUCCESS_URL,
};
pub use error::AgentError;
pub use lifecycle::{
    reduce_lifecycle, LifecycleAction, LifecycleError, LifecycleState, WorkerPhase,
};
pub use response::{DeferredWork, InterceptedResponse};
pub use router::{ClientDeliveryRouter, DeliveryRoute, ReadySignals, RoutedDelivery};
