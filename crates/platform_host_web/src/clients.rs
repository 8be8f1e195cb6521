//! `self.clients`-backed window registry for the service-worker scope.

use platform_host::{ClientFuture, ClientId, ClientInfo, ClientRegistry};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
/// Window-client registry backed by the service worker's `Clients` interface.
pub struct WebClientRegistry;

#[cfg(target_arch = "wasm32")]
async fn find_client(client: &ClientId) -> Result<web_sys::Client, String> {
    use wasm_bindgen::JsCast;

    let clients = crate::interop::worker_scope()?.clients();
    let found = crate::interop::await_promise(clients.get(&client.0), "clients.get failed").await?;
    if found.is_undefined() || found.is_null() {
        return Err(format!("client {client} is gone"));
    }
    found
        .dyn_into::<web_sys::Client>()
        .map_err(|_| format!("client {client} resolved to a non-client value"))
}

#[cfg(target_arch = "wasm32")]
async fn match_windows(include_uncontrolled: bool) -> Result<Vec<web_sys::Client>, String> {
    use wasm_bindgen::{JsCast, JsValue};

    let options = js_sys::Object::new();
    crate::interop::set_property(&options, "type", &JsValue::from_str("window"))?;
    crate::interop::set_property(
        &options,
        "includeUncontrolled",
        &JsValue::from_bool(include_uncontrolled),
    )?;
    let clients = crate::interop::worker_scope()?.clients();
    let listed = crate::interop::await_promise(
        clients.match_all_with_options(options.unchecked_ref()),
        "clients.matchAll failed",
    )
    .await?;
    Ok(js_sys::Array::from(&listed)
        .iter()
        .filter_map(|value| value.dyn_into::<web_sys::Client>().ok())
        .collect())
}

impl ClientRegistry for WebClientRegistry {
    fn window_clients<'a>(
        &'a self,
        include_uncontrolled: bool,
    ) -> ClientFuture<'a, Result<Vec<ClientInfo>, String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let listed = match_windows(include_uncontrolled).await?;
                let controlled: Vec<String> = if include_uncontrolled {
                    match_windows(false)
                        .await?
                        .iter()
                        .map(web_sys::Client::id)
                        .collect()
                } else {
                    listed.iter().map(web_sys::Client::id).collect()
                };
                Ok(listed
                    .into_iter()
                    .map(|client| {
                        let id = client.id();
                        ClientInfo {
                            controlled: controlled.contains(&id),
                            id: ClientId(id),
                            url: client.url(),
                        }
                    })
                    .collect())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = include_uncontrolled;
                Ok(Vec::new())
            }
        })
    }

    fn focus<'a>(&'a self, client: &'a ClientId) -> ClientFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                use wasm_bindgen::JsCast;

                let window = find_client(client)
                    .await?
                    .dyn_into::<web_sys::WindowClient>()
                    .map_err(|_| format!("client {client} is not a window"))?;
                let promise = window
                    .focus()
                    .map_err(|err| crate::interop::js_error("focus failed", err))?;
                crate::interop::await_promise(promise, "focus failed")
                    .await
                    .map(|_| ())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                Err(format!("client {client} is gone"))
            }
        })
    }

    fn post_message<'a>(
        &'a self,
        client: &'a ClientId,
        message: &'a Value,
    ) -> ClientFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                use serde::Serialize;

                let payload = message
                    .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
                    .map_err(|err| format!("encoding message failed: {err}"))?;
                find_client(client)
                    .await?
                    .post_message(&payload)
                    .map_err(|err| crate::interop::js_error("postMessage failed", err))
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = message;
                Err(format!("client {client} is gone"))
            }
        })
    }

    fn open_window<'a>(
        &'a self,
        url: &'a str,
    ) -> ClientFuture<'a, Result<Option<ClientId>, String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                use wasm_bindgen::JsCast;

                let clients = crate::interop::worker_scope()?.clients();
                let opened =
                    crate::interop::await_promise(clients.open_window(url), "openWindow failed")
                        .await?;
                Ok(opened
                    .dyn_into::<web_sys::Client>()
                    .ok()
                    .map(|client| ClientId(client.id())))
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = url;
                Ok(None)
            }
        })
    }
}
