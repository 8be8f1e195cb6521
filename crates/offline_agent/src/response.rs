use std::fmt;

use futures::future::LocalBoxFuture;
use platform_host::FetchResponse;

/// Work that must finish after the response is handed back, such as a cache write or a
/// delayed share delivery. The host keeps the agent alive until it completes.
pub type DeferredWork = LocalBoxFuture<'static, ()>;

/// Response produced for an intercepted request plus any follow-up work.
pub struct InterceptedResponse {
    /// Response handed to the requesting page.
    pub response: FetchResponse,
    /// Follow-up work to extend the agent's lifetime with.
    pub deferred: Option<DeferredWork>,
}

impl InterceptedResponse {
    /// Wraps a response that needs no follow-up work.
    pub fn immediate(response: FetchResponse) -> Self {
        Self {
            response,
            deferred: None,
        }
    }

    /// Wraps a response whose follow-up work must outlive the request.
    pub fn with_deferred(response: FetchResponse, deferred: DeferredWork) -> Self {
        Self {
            response,
            deferred: Some(deferred),
        }
    }

    /// Splits into the response and its follow-up work.
    pub fn into_parts(self) -> (FetchResponse, Option<DeferredWork>) {
        (self.response, self.deferred)
    }
}

impl fmt::Debug for InterceptedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptedResponse")
            .field("response", &self.response)
            .field("deferred", &self.deferred.is_some())
            .finish()
    }
}
