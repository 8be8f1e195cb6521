//! Network fetch service contracts and a scripted in-memory adapter.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use super::types::{FetchRequest, FetchResponse};

/// Object-safe boxed future used by [`NetworkFetcher`].
pub type NetworkFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service performing real network requests on behalf of the agent.
pub trait NetworkFetcher {
    /// Fetches `request` from the network.
    ///
    /// Transport failures are reported as `Err`; HTTP error statuses are successful fetches.
    fn fetch<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> NetworkFuture<'a, Result<FetchResponse, String>>;
}

#[derive(Debug, Default)]
struct MemoryNetworkState {
    routes: HashMap<String, FetchResponse>,
    offline: bool,
    requests: Vec<FetchRequest>,
}

#[derive(Debug, Clone, Default)]
/// Scripted network adapter: URLs resolve to preregistered responses, unknown URLs fail.
pub struct MemoryNetwork {
    inner: Rc<RefCell<MemoryNetworkState>>,
}

impl MemoryNetwork {
    /// Registers the response served for `url`.
    pub fn route(&self, url: impl Into<String>, response: FetchResponse) {
        self.inner.borrow_mut().routes.insert(url.into(), response);
    }

    /// Simulates losing (or regaining) connectivity.
    pub fn set_offline(&self, offline: bool) {
        self.inner.borrow_mut().offline = offline;
    }

    /// Returns every request observed so far, in order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.inner.borrow().requests.clone()
    }

    /// Returns the number of requests observed so far.
    pub fn request_count(&self) -> usize {
        self.inner.borrow().requests.len()
    }
}

impl NetworkFetcher for MemoryNetwork {
    fn fetch<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> NetworkFuture<'a, Result<FetchResponse, String>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.requests.push(request.clone());
            if state.offline {
                return Err(format!("network unreachable: {}", request.url));
            }
            state
                .routes
                .get(&request.url)
                .cloned()
                .ok_or_else(|| format!("no route for {}", request.url))
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn memory_network_serves_routes_and_records_requests() {
        let network = MemoryNetwork::default();
        network.route("/app.js", FetchResponse::new(200, b"js".to_vec()));
        let fetcher: &dyn NetworkFetcher = &network;

        let response = block_on(fetcher.fetch(&FetchRequest::get("/app.js"))).expect("fetch");
        assert_eq!(response.body(), b"js");
        assert!(block_on(fetcher.fetch(&FetchRequest::get("/missing"))).is_err());
        assert_eq!(network.request_count(), 2);
    }

    #[test]
    fn offline_network_fails_every_request() {
        let network = MemoryNetwork::default();
        network.route("/", FetchResponse::new(200, Vec::new()));
        network.set_offline(true);

        let err = block_on(network.fetch(&FetchRequest::get("/"))).expect_err("offline");
        assert!(err.contains("unreachable"));
    }
}
