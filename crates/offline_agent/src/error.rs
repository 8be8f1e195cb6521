use thiserror::Error;

use crate::lifecycle::LifecycleError;

/// Failures surfaced by [`crate::OfflineAgent`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// A lifecycle event arrived out of order.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    /// The cache generation could not be opened or written.
    #[error("cache generation `{generation}` unavailable: {reason}")]
    CacheUnavailable {
        /// Generation id.
        generation: String,
        /// Host error message.
        reason: String,
    },
    /// A manifest asset could not be precached, so the install was abandoned.
    #[error("precache of `{asset}` failed: {reason}")]
    Precache {
        /// Manifest path.
        asset: String,
        /// Network error or unexpected status.
        reason: String,
    },
    /// A cache miss could not be satisfied by the network.
    #[error("network fetch of `{url}` failed: {reason}")]
    Network {
        /// Request URL.
        url: String,
        /// Host error message.
        reason: String,
    },
}
