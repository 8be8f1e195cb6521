//! Page-side browser bindings: agent registration, agent messaging, and location helpers.
//!
//! Everything here runs in a window context. Outside `wasm32` the functions degrade to
//! inert fallbacks so callers compile and test natively.

use std::rc::Rc;

use serde_json::Value;

/// Location parts of the current page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageLocation {
    /// Host name without port.
    pub hostname: String,
    /// Path component.
    pub pathname: String,
    /// Query string including the leading `?`, or empty.
    pub search: String,
}

/// Reads the current page location.
pub fn page_location() -> Option<PageLocation> {
    #[cfg(target_arch = "wasm32")]
    {
        let location = web_sys::window()?.location();
        Some(PageLocation {
            hostname: location.hostname().ok()?,
            pathname: location.pathname().ok()?,
            search: location.search().ok()?,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

/// Returns whether the page is embedded in another browsing context.
pub fn is_framed() -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(window) = web_sys::window() else {
            return false;
        };
        match window.top() {
            Ok(Some(top)) => !js_sys::Object::is(top.as_ref(), window.as_ref()),
            // An inaccessible top is a cross-origin parent.
            Ok(None) | Err(_) => true,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        false
    }
}

/// Replaces the current history entry's URL without reloading.
///
/// # Errors
///
/// Returns an error when the history API is unavailable or rejects the URL.
pub fn replace_page_url(url: &str) -> Result<(), String> {
    #[cfg(target_arch = "wasm32")]
    {
        let history = web_sys::window()
            .ok_or_else(|| "window unavailable".to_string())?
            .history()
            .map_err(|err| crate::interop::js_error("history unavailable", err))?;
        history
            .replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url))
            .map_err(|err| crate::interop::js_error("history.replaceState failed", err))
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = url;
        Ok(())
    }
}

/// Returns whether the browser exposes `navigator.serviceWorker`.
pub fn agent_supported() -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .map(|window| {
                js_sys::Reflect::has(window.navigator().as_ref(), &"serviceWorker".into())
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        false
    }
}

const LOCAL_HOSTNAMES: [&str; 2] = ["localhost", "127.0.0.1"];

/// Returns whether a page on `hostname` should run the agent.
///
/// Local development hosts and framed pages never do, so stale caches cannot shadow a dev
/// server or leak into an embedding page.
pub fn should_register(hostname: &str, framed: bool) -> bool {
    !framed && !LOCAL_HOSTNAMES.contains(&hostname)
}

/// Returns whether this page supports the agent and is allowed to run it.
pub fn page_allows_agent() -> bool {
    if !agent_supported() {
        return false;
    }
    let hostname = page_location()
        .map(|location| location.hostname)
        .unwrap_or_default();
    should_register(&hostname, is_framed())
}

#[cfg(target_arch = "wasm32")]
fn agent_container() -> Result<web_sys::ServiceWorkerContainer, String> {
    if !agent_supported() {
        return Err("service workers are unsupported".to_string());
    }
    web_sys::window()
        .map(|window| window.navigator().service_worker())
        .ok_or_else(|| "window unavailable".to_string())
}

#[cfg(target_arch = "wasm32")]
async fn ready_registration() -> Result<web_sys::ServiceWorkerRegistration, String> {
    use wasm_bindgen::JsCast;

    let ready = agent_container()?
        .ready()
        .map_err(|err| crate::interop::js_error("serviceWorker.ready unavailable", err))?;
    crate::interop::await_promise(ready, "serviceWorker.ready failed")
        .await?
        .dyn_into::<web_sys::ServiceWorkerRegistration>()
        .map_err(|_| "serviceWorker.ready resolved to a non-registration".to_string())
}

/// Registers the agent script and reports each newly installed version.
///
/// `on_installed` receives whether the page was already controlled when the new version
/// finished installing: `true` means an update is waiting, `false` means first-time caching.
///
/// # Errors
///
/// Returns an error when registration is unsupported or rejected.
pub async fn register_agent(
    script_url: &str,
    on_installed: Rc<dyn Fn(bool)>,
) -> Result<(), String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::{closure::Closure, JsCast};

        let container = agent_container()?;
        let registration = crate::interop::await_promise(
            container.register(script_url),
            "service worker registration failed",
        )
        .await?
        .dyn_into::<web_sys::ServiceWorkerRegistration>()
        .map_err(|_| "registration resolved to a non-registration".to_string())?;

        let watched = registration.clone();
        let on_update = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_| {
            let Some(installing) = watched.installing() else {
                return;
            };
            let worker = installing.clone();
            let container = container.clone();
            let callback = Rc::clone(&on_installed);
            let on_state = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_| {
                if worker.state() == web_sys::ServiceWorkerState::Installed {
                    callback(container.controller().is_some());
                }
            }));
            installing.set_onstatechange(Some(on_state.as_ref().unchecked_ref()));
            on_state.forget();
        }));
        registration.set_onupdatefound(Some(on_update.as_ref().unchecked_ref()));
        on_update.forget();
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = (script_url, on_installed);
        Err("service workers are only available when compiled for wasm32".to_string())
    }
}

/// Unregisters the agent registered for this page's scope, if any.
///
/// # Errors
///
/// Returns an error when the registration cannot be reached or refuses to unregister.
pub async fn unregister_agent() -> Result<(), String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;

        let found = crate::interop::await_promise(
            agent_container()?.get_registration(),
            "looking up registration failed",
        )
        .await?;
        let Ok(registration) = found.dyn_into::<web_sys::ServiceWorkerRegistration>() else {
            return Ok(());
        };
        let promise = registration
            .unregister()
            .map_err(|err| crate::interop::js_error("unregister failed", err))?;
        crate::interop::await_promise(promise, "unregister failed")
            .await
            .map(|_| ())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Ok(())
    }
}

/// Posts `message` to the active agent once one is ready.
///
/// # Errors
///
/// Returns an error when no agent becomes active or the message cannot be encoded.
pub async fn post_to_agent(message: &Value) -> Result<(), String> {
    #[cfg(target_arch = "wasm32")]
    {
        use serde::Serialize;

        let active = ready_registration()
            .await?
            .active()
            .ok_or_else(|| "no active service worker".to_string())?;
        let payload = message
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| format!("encoding message failed: {err}"))?;
        active
            .post_message(&payload)
            .map_err(|err| crate::interop::js_error("postMessage failed", err))
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        Err("service workers are only available when compiled for wasm32".to_string())
    }
}

/// Calls `handler` with every message the agent posts to this page.
///
/// The listener lives for the rest of the page's lifetime.
///
/// # Errors
///
/// Returns an error when service workers are unsupported or the listener cannot be attached.
pub fn listen_for_agent_messages(handler: impl FnMut(Value) + 'static) -> Result<(), String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::{closure::Closure, JsCast};

        let mut handler = handler;
        let on_message = Closure::<dyn FnMut(web_sys::MessageEvent)>::wrap(Box::new(
            move |event: web_sys::MessageEvent| {
                if let Ok(value) = serde_wasm_bindgen::from_value::<Value>(event.data()) {
                    handler(value);
                }
            },
        ));
        agent_container()?
            .add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())
            .map_err(|err| crate::interop::js_error("attaching message listener failed", err))?;
        on_message.forget();
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = handler;
        Err("service workers are only available when compiled for wasm32".to_string())
    }
}
