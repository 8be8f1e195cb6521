//! Background agent facade driven by the host's lifecycle, fetch, and message events.

use std::cell::RefCell;

use leptos::logging;
use platform_host::{AgentHostServices, ClientId, FetchRequest, FetchResponse};
use serde_json::Value;
use share_contract::{classify_share_request, parse_request_url, RelayMessage, SharePayload};

use crate::{
    reduce_lifecycle, AgentConfig, AgentError, CacheFirstPolicy, ClientDeliveryRouter,
    InterceptedResponse, LifecycleAction, LifecycleError, LifecycleState, ReadySignals,
    WorkerPhase,
};

/// How an intercepted request is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRoute {
    /// Let the platform handle the request.
    Bypass,
    /// Share-target request carrying `SharePayload`.
    Share(SharePayload),
    /// Serve from the cache, falling back to the network.
    CacheFirst,
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Generation that was populated.
    pub generation: String,
    /// Number of manifest assets stored.
    pub cached_assets: usize,
}

/// Result of a completed activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    /// Generation now in service.
    pub generation: String,
    /// Stale generations removed during activation.
    pub deleted_generations: Vec<String>,
}

/// Offline-first agent with share-target relaying.
pub struct OfflineAgent {
    config: AgentConfig,
    lifecycle: RefCell<LifecycleState>,
    services: AgentHostServices,
    policy: CacheFirstPolicy,
    router: ClientDeliveryRouter,
    ready: ReadySignals,
}

impl OfflineAgent {
    /// Creates an agent that has not been installed yet.
    pub fn new(config: AgentConfig, services: AgentHostServices) -> Self {
        Self::resume(config, services, WorkerPhase::Uninstalled)
    }

    /// Creates an agent in `phase`, as observed from the platform at startup.
    pub fn resume(config: AgentConfig, services: AgentHostServices, phase: WorkerPhase) -> Self {
        let ready = ReadySignals::default();
        let policy = CacheFirstPolicy::new(&services, config.generation_id.clone());
        let router = ClientDeliveryRouter::new(
            services.clients.clone(),
            services.timer.clone(),
            ready.clone(),
            config.share_entry_url.clone(),
            config.delivery,
        );
        Self {
            config,
            lifecycle: RefCell::new(LifecycleState::resumed(phase)),
            services,
            policy,
            router,
            ready,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> WorkerPhase {
        self.lifecycle.borrow().phase
    }

    fn dispatch(&self, action: LifecycleAction) -> Result<(), LifecycleError> {
        reduce_lifecycle(&mut self.lifecycle.borrow_mut(), action)
    }

    /// Precaches the manifest into this build's generation, then asks to skip waiting.
    ///
    /// # Errors
    ///
    /// Returns an error when the install event arrives out of order or any manifest asset
    /// cannot be cached. A failed install returns the agent to
    /// [`WorkerPhase::Uninstalled`] so the platform can retry.
    pub async fn install(&self) -> Result<InstallReport, AgentError> {
        self.dispatch(LifecycleAction::BeginInstall)?;
        let cached_assets = match self.policy.precache(&self.config.precache_manifest).await {
            Ok(cached) => cached,
            Err(err) => {
                logging::warn!("install of {} failed: {err}", self.config.generation_id);
                self.dispatch(LifecycleAction::InstallFailed)?;
                return Err(err);
            }
        };
        if let Err(err) = self.services.control.skip_waiting().await {
            logging::warn!("skip waiting failed: {err}");
        }
        self.dispatch(LifecycleAction::InstallSucceeded)?;
        logging::log!(
            "installed {} with {cached_assets} precached assets",
            self.config.generation_id
        );
        Ok(InstallReport {
            generation: self.config.generation_id.clone(),
            cached_assets,
        })
    }

    /// Deletes stale cache generations and claims open windows.
    ///
    /// # Errors
    ///
    /// Returns an error when the activate event arrives before a successful install.
    pub async fn activate(&self) -> Result<ActivationReport, AgentError> {
        self.dispatch(LifecycleAction::BeginActivate)?;
        let deleted_generations = self.policy.retain_current_generation().await;
        if let Err(err) = self.services.control.claim_clients().await {
            logging::warn!("claiming clients failed: {err}");
        }
        self.dispatch(LifecycleAction::ActivationCompleted)?;
        logging::log!("activated {}", self.config.generation_id);
        Ok(ActivationReport {
            generation: self.config.generation_id.clone(),
            deleted_generations,
        })
    }

    /// Decides how `request` is handled. Nothing is intercepted before activation.
    ///
    /// The navigation of a window opened to receive a share carries the share marker but
    /// no payload; it is served like any other page.
    pub fn route_fetch(&self, request: &FetchRequest) -> FetchRoute {
        if !self.phase().serves_fetches() {
            return FetchRoute::Bypass;
        }
        if self.is_entry_navigation(&request.url) {
            return FetchRoute::CacheFirst;
        }
        match classify_share_request(&request.url) {
            Some(payload) => FetchRoute::Share(payload),
            None => FetchRoute::CacheFirst,
        }
    }

    fn is_entry_navigation(&self, raw_url: &str) -> bool {
        match (
            parse_request_url(raw_url),
            parse_request_url(&self.config.share_entry_url),
        ) {
            (Some(requested), Some(entry)) => {
                requested.path() == entry.path() && requested.query() == entry.query()
            }
            _ => false,
        }
    }

    /// Answers a non-share request cache-first.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Network`] when the request misses the cache and the network
    /// fails.
    pub async fn respond_cache_first(
        &self,
        request: &FetchRequest,
    ) -> Result<InterceptedResponse, AgentError> {
        self.policy.respond(request).await
    }

    /// Relays `payload` to a window and answers with the share-success redirect.
    ///
    /// Delivery problems never change the answer.
    pub async fn respond_share(&self, payload: SharePayload) -> InterceptedResponse {
        let routed = self.router.route(payload).await;
        logging::log!("share routed: {:?}", routed.route);
        InterceptedResponse {
            response: FetchResponse::redirect(&self.config.share_success_url),
            deferred: routed.deferred,
        }
    }

    /// Routes and answers `request`. `None` means the platform should handle it.
    pub async fn handle_fetch(
        &self,
        request: &FetchRequest,
    ) -> Option<Result<InterceptedResponse, AgentError>> {
        match self.route_fetch(request) {
            FetchRoute::Bypass => None,
            FetchRoute::Share(payload) => Some(Ok(self.respond_share(payload).await)),
            FetchRoute::CacheFirst => Some(self.respond_cache_first(request).await),
        }
    }

    /// Handles a message posted by a foreground window. Returns whether it was recognized.
    pub fn handle_client_message(&self, source: &ClientId, message: &Value) -> bool {
        match RelayMessage::from_value(message) {
            Some(RelayMessage::ClientReady) => {
                self.ready.notify_ready(source);
                true
            }
            _ => false,
        }
    }
}
