//! Concrete browser adapter factories for runtime wiring.

use std::rc::Rc;

use platform_host::AgentHostServices;

use crate::{
    WebAssetCache, WebClientRegistry, WebDelayTimer, WebNetworkFetcher, WebSlotStore,
    WebWorkerControl,
};

/// Builds the host service bundle for an agent running in a service-worker scope.
pub fn agent_host_services() -> AgentHostServices {
    AgentHostServices {
        cache: Rc::new(WebAssetCache),
        network: Rc::new(WebNetworkFetcher),
        clients: Rc::new(WebClientRegistry),
        control: Rc::new(WebWorkerControl),
        timer: Rc::new(WebDelayTimer),
    }
}

/// Builds the durable slot store used by foreground pages.
pub fn slot_store() -> WebSlotStore {
    WebSlotStore
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;
    use platform_host::{take_slot_with, FetchRequest, SHARED_URL_SLOT};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn native_fallbacks_are_inert() {
        let services = agent_host_services();
        assert!(block_on(services.network.fetch(&FetchRequest::get("/"))).is_err());
        assert_eq!(block_on(services.clients.window_clients(true)), Ok(Vec::new()));
        assert_eq!(block_on(services.clients.open_window("/")), Ok(None));
        assert_eq!(block_on(services.control.claim_clients()), Ok(()));
        block_on(services.timer.sleep(1_000));

        assert_eq!(block_on(take_slot_with(&slot_store(), SHARED_URL_SLOT)), Ok(None));
    }
}
