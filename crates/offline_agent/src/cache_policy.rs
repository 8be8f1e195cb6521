//! Cache-first request handling over one versioned cache generation.
//!
//! Reads and writes only ever touch the generation this agent build owns. Install fetches the
//! whole manifest before writing anything, so a failed install leaves no partial entries.

use std::rc::Rc;

use futures::future::join_all;
use leptos::logging;
use platform_host::{
    AgentHostServices, AssetCacheStore, CacheHandle, FetchRequest, NetworkFetcher,
    RequestIdentity,
};

use crate::{AgentError, InterceptedResponse};

/// Cache-first policy bound to a single generation.
#[derive(Clone)]
pub struct CacheFirstPolicy {
    cache: Rc<dyn AssetCacheStore>,
    network: Rc<dyn NetworkFetcher>,
    generation: String,
}

impl CacheFirstPolicy {
    /// Binds the policy to `generation` using the host's cache and network adapters.
    pub fn new(services: &AgentHostServices, generation: impl Into<String>) -> Self {
        Self {
            cache: Rc::clone(&services.cache),
            network: Rc::clone(&services.network),
            generation: generation.into(),
        }
    }

    /// Generation owned by this policy.
    pub fn generation(&self) -> &str {
        &self.generation
    }

    async fn open(&self) -> Result<CacheHandle, AgentError> {
        CacheHandle::open(Rc::clone(&self.cache), self.generation.clone())
            .await
            .map_err(|reason| AgentError::CacheUnavailable {
                generation: self.generation.clone(),
                reason,
            })
    }

    /// Fetches every manifest asset and stores them all, or stores nothing.
    ///
    /// Returns the number of cached assets.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Precache`] when any asset fails to fetch or answers with a status
    /// other than `200`, and [`AgentError::CacheUnavailable`] when the generation cannot be
    /// opened or written.
    pub async fn precache(&self, manifest: &[String]) -> Result<usize, AgentError> {
        let handle = self.open().await?;
        logging::log!("opened cache {}", self.generation);

        let requests: Vec<FetchRequest> = manifest.iter().map(FetchRequest::get).collect();
        let responses = join_all(requests.iter().map(|request| self.network.fetch(request))).await;

        let mut fetched = Vec::with_capacity(requests.len());
        for (request, response) in requests.iter().zip(responses) {
            let response = response.map_err(|reason| AgentError::Precache {
                asset: request.url.clone(),
                reason,
            })?;
            if !response.is_ok() {
                return Err(AgentError::Precache {
                    asset: request.url.clone(),
                    reason: format!("unexpected status {}", response.status),
                });
            }
            fetched.push((RequestIdentity::for_get(&request.url), response.snapshot()));
        }

        let cached = fetched.len();
        for (identity, snapshot) in fetched {
            handle
                .put(&identity, snapshot)
                .await
                .map_err(|reason| AgentError::CacheUnavailable {
                    generation: self.generation.clone(),
                    reason,
                })?;
        }
        Ok(cached)
    }

    /// Deletes every generation except the one this policy owns and returns the deleted ids.
    ///
    /// Individual failures are logged and skipped.
    pub async fn retain_current_generation(&self) -> Vec<String> {
        let generations = match self.cache.generations().await {
            Ok(generations) => generations,
            Err(err) => {
                logging::warn!("listing cache generations failed: {err}");
                return Vec::new();
            }
        };

        let mut deleted = Vec::new();
        for generation in generations {
            if generation == self.generation {
                continue;
            }
            match self.cache.delete_generation(&generation).await {
                Ok(true) => {
                    logging::log!("deleted stale cache generation {generation}");
                    deleted.push(generation);
                }
                Ok(false) => {}
                Err(err) => logging::warn!("deleting cache generation {generation} failed: {err}"),
            }
        }
        deleted
    }

    /// Answers `request` from the cache, falling back to the network.
    ///
    /// A `200` network answer to a `GET` is returned right away and written to the cache as
    /// deferred work. Cache lookup and write failures degrade to network-only behavior.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Network`] when the request misses the cache and the network
    /// fails.
    pub async fn respond(&self, request: &FetchRequest) -> Result<InterceptedResponse, AgentError> {
        let handle = match self.open().await {
            Ok(handle) => Some(handle),
            Err(err) => {
                logging::warn!("{err}; serving from network only");
                None
            }
        };
        let identity = RequestIdentity::from_request(request);

        if let (Some(handle), Some(identity)) = (&handle, &identity) {
            match handle.match_request(identity).await {
                Ok(Some(stored)) => return Ok(InterceptedResponse::immediate(stored.to_response())),
                Ok(None) => {}
                Err(err) => logging::warn!("cache lookup for {identity} failed: {err}"),
            }
        }

        let response = self
            .network
            .fetch(request)
            .await
            .map_err(|reason| AgentError::Network {
                url: request.url.clone(),
                reason,
            })?;

        match (handle, identity) {
            (Some(handle), Some(identity)) if response.is_ok() => {
                let snapshot = response.snapshot();
                let write = Box::pin(async move {
                    if let Err(err) = handle.put(&identity, snapshot).await {
                        logging::warn!("caching {identity} failed: {err}");
                    }
                });
                Ok(InterceptedResponse::with_deferred(response, write))
            }
            _ => Ok(InterceptedResponse::immediate(response)),
        }
    }
}
