//! `fetch()`-backed network adapter.

use platform_host::{FetchRequest, FetchResponse, NetworkFetcher, NetworkFuture};

#[derive(Debug, Clone, Copy, Default)]
/// Browser network adapter calling the global `fetch`.
pub struct WebNetworkFetcher;

impl NetworkFetcher for WebNetworkFetcher {
    fn fetch<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> NetworkFuture<'a, Result<FetchResponse, String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                use wasm_bindgen::JsCast;

                let web_request = crate::interop::request_to_web(request)?;
                let global = js_sys::global();
                let promise = if let Some(scope) = global.dyn_ref::<web_sys::WorkerGlobalScope>()
                {
                    scope.fetch_with_request(&web_request)
                } else if let Some(window) = global.dyn_ref::<web_sys::Window>() {
                    window.fetch_with_request(&web_request)
                } else {
                    return Err("fetch unavailable in this context".to_string());
                };
                let answer = crate::interop::await_promise(
                    promise,
                    &format!("network fetch of {} failed", request.url),
                )
                .await?;
                let response = answer
                    .dyn_into::<web_sys::Response>()
                    .map_err(|_| "fetch resolved to a non-response value".to_string())?;
                crate::interop::response_from_web(response).await
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                Err(format!(
                    "network unavailable outside wasm32: {} {}",
                    request.method, request.url
                ))
            }
        })
    }
}
