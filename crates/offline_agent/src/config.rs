//! Agent configuration: cache generation, precache manifest, and share routing targets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generation id shipped with the default configuration. Bump on every deployment that
/// changes cached asset content.
pub const DEFAULT_GENERATION_ID: &str = "linkshare-shell-v2";

/// Application-shell assets cached at install time.
pub const DEFAULT_PRECACHE_MANIFEST: [&str; 8] = [
    "/",
    "/index.html",
    "/manifest.json",
    "/favicon.ico",
    "/favicon.svg",
    "/icons/apple-touch-icon.png",
    "/icons/icon-192x192.png",
    "/icons/icon-512x512.png",
];

/// Redirect answered to every share-target request.
pub const DEFAULT_SHARE_SUCCESS_URL: &str = "/?share-success=true";

/// Entry URL of windows opened to receive a share.
pub const DEFAULT_SHARE_ENTRY_URL: &str = "/?share-target=true";

/// Delay used by [`DeliveryMode::FixedDelay`] in the default configuration.
pub const DEFAULT_DELIVERY_DELAY_MS: u32 = 1_000;

/// Longest wait for a ready signal before delivering anyway.
pub const DEFAULT_READY_TIMEOUT_MS: u32 = 10_000;

/// How a share reaches a window the agent just opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum DeliveryMode {
    /// Wait for the window's `SHARE_READY` message, then deliver. When the timeout elapses
    /// first, deliver once anyway.
    ReadyHandshake {
        /// Upper bound on the wait, in milliseconds.
        timeout_ms: u32,
    },
    /// Deliver after a fixed delay, with no readiness check.
    FixedDelay {
        /// Delay in milliseconds.
        delay_ms: u32,
    },
}

impl Default for DeliveryMode {
    fn default() -> Self {
        Self::ReadyHandshake {
            timeout_ms: DEFAULT_READY_TIMEOUT_MS,
        }
    }
}

/// Configuration errors detected while loading [`AgentConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("agent config parse failed: {0}")]
    Parse(#[from] toml::de::Error),
    /// The generation id is empty.
    #[error("generation_id must not be empty")]
    EmptyGenerationId,
    /// The precache manifest is empty.
    #[error("precache_manifest must list at least one asset")]
    EmptyManifest,
    /// A path or URL is not root-relative.
    #[error("`{field}` must be a root-relative path, got `{value}`")]
    NotRootRelative {
        /// Offending field name.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Runtime configuration injected into the agent at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Name of the cache generation owned by this agent build.
    pub generation_id: String,
    /// Assets fetched and cached at install time; all must succeed.
    pub precache_manifest: Vec<String>,
    /// Redirect answered to share-target requests.
    pub share_success_url: String,
    /// URL of windows opened to receive a share.
    pub share_entry_url: String,
    /// Delivery strategy for freshly opened windows.
    pub delivery: DeliveryMode,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            generation_id: DEFAULT_GENERATION_ID.to_string(),
            precache_manifest: DEFAULT_PRECACHE_MANIFEST
                .iter()
                .map(|path| path.to_string())
                .collect(),
            share_success_url: DEFAULT_SHARE_SUCCESS_URL.to_string(),
            share_entry_url: DEFAULT_SHARE_ENTRY_URL.to_string(),
            delivery: DeliveryMode::default(),
        }
    }
}

impl AgentConfig {
    /// Parses and validates a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns a copy using `generation_id`.
    pub fn with_generation_id(mut self, generation_id: impl Into<String>) -> Self {
        self.generation_id = generation_id.into();
        self
    }

    /// Returns a copy using `delivery`.
    pub fn with_delivery(mut self, delivery: DeliveryMode) -> Self {
        self.delivery = delivery;
        self
    }

    /// Checks the invariants the agent relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation_id.trim().is_empty() {
            return Err(ConfigError::EmptyGenerationId);
        }
        if self.precache_manifest.is_empty() {
            return Err(ConfigError::EmptyManifest);
        }
        for path in &self.precache_manifest {
            require_root_relative("precache_manifest", path)?;
        }
        require_root_relative("share_success_url", &self.share_success_url)?;
        require_root_relative("share_entry_url", &self.share_entry_url)
    }
}

fn require_root_relative(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with('/') && !value.starts_with("//") {
        Ok(())
    } else {
        Err(ConfigError::NotRootRelative {
            field,
            value: value.to_string(),
        })
    }
}
