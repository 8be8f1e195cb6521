//! Host service bundle injected into the background agent.

use std::rc::Rc;

use crate::{
    AssetCacheStore, ClientRegistry, DelayTimer, MemoryAssetCache, MemoryClientRegistry,
    MemoryDelayTimer, MemoryNetwork, MemoryWorkerControl, NetworkFetcher, WorkerControl,
};

/// Runtime-selected host services for one agent instance.
///
/// All environment-specific adapter selection happens before this bundle reaches
/// `offline_agent`, which keeps the agent free of `web-sys` types.
#[derive(Clone)]
pub struct AgentHostServices {
    /// Versioned asset cache storage.
    pub cache: Rc<dyn AssetCacheStore>,
    /// Network transport used on cache misses and during install.
    pub network: Rc<dyn NetworkFetcher>,
    /// Foreground window enumeration and messaging.
    pub clients: Rc<dyn ClientRegistry>,
    /// Lifecycle hooks (skip-waiting, client claiming).
    pub control: Rc<dyn WorkerControl>,
    /// Timer used by delivery fallbacks.
    pub timer: Rc<dyn DelayTimer>,
}

/// Concrete in-memory adapters plus the bundle built from them.
///
/// Tests keep the concrete handles to script the network and inspect recorded calls.
#[derive(Debug, Clone, Default)]
pub struct MemoryAgentHost {
    /// In-memory asset cache.
    pub cache: MemoryAssetCache,
    /// Scripted network.
    pub network: MemoryNetwork,
    /// In-memory window registry.
    pub clients: MemoryClientRegistry,
    /// Counting lifecycle hooks.
    pub control: MemoryWorkerControl,
    /// Immediate timer.
    pub timer: MemoryDelayTimer,
}

impl MemoryAgentHost {
    /// Builds an [`AgentHostServices`] bundle sharing state with these adapters.
    pub fn services(&self) -> AgentHostServices {
        AgentHostServices {
            cache: Rc::new(self.cache.clone()),
            network: Rc::new(self.network.clone()),
            clients: Rc::new(self.clients.clone()),
            control: Rc::new(self.control.clone()),
            timer: Rc::new(self.timer.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::FetchRequest;

    #[test]
    fn services_share_state_with_memory_adapters() {
        let host = MemoryAgentHost::default();
        let services = host.services();

        block_on(services.cache.open("shell-v1")).expect("open");
        let _ = block_on(services.network.fetch(&FetchRequest::get("/")));
        block_on(services.control.skip_waiting()).expect("skip waiting");

        assert_eq!(host.cache.entry_count("shell-v1"), 0);
        assert_eq!(host.network.request_count(), 1);
        assert_eq!(host.control.skip_waiting_calls(), 1);
    }
}
