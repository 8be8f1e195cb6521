//! Service-worker event handlers exported to the `sw.js` loader.
//!
//! The loader attaches every listener during its first evaluation and forwards events here
//! once the module has loaded. Fetches that arrive earlier are answered through
//! [`respond_late`].

use std::{cell::RefCell, rc::Rc};

use futures::channel::oneshot;
use js_sys::Promise;
use leptos::logging;
use offline_agent::{DeferredWork, FetchRoute, OfflineAgent};
use platform_host::{ClientId, FetchRequest, FetchResponse};
use platform_host_web::{agent_host_services, request_from_web, response_to_web};
use serde_json::Value;
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
use wasm_bindgen_futures::future_to_promise;

use crate::{
    is_interceptable, load_config, redirect_target, resume_phase, RegistrationSlots,
    BUNDLED_CONFIG,
};

struct WorkerState {
    agent: Rc<OfflineAgent>,
    origin: String,
}

thread_local! {
    static WORKER: RefCell<Option<Rc<WorkerState>>> = const { RefCell::new(None) };
}

pub(crate) fn start() -> Result<(), JsValue> {
    let scope = worker_scope()?;
    let phase = resume_phase(&own_state(&scope), registration_slots(&scope));
    let agent = Rc::new(OfflineAgent::resume(
        load_config(BUNDLED_CONFIG),
        agent_host_services(),
        phase,
    ));
    logging::log!(
        "agent {} starting in phase {phase}",
        agent.config().generation_id
    );
    let state = WorkerState {
        agent,
        origin: scope.location().origin(),
    };
    WORKER.with(|slot| *slot.borrow_mut() = Some(Rc::new(state)));
    Ok(())
}

fn worker_scope() -> Result<web_sys::ServiceWorkerGlobalScope, JsValue> {
    js_sys::global()
        .dyn_into::<web_sys::ServiceWorkerGlobalScope>()
        .map_err(JsValue::from)
}

fn worker_state() -> Result<Rc<WorkerState>, JsValue> {
    WORKER
        .with(|slot| slot.borrow().clone())
        .ok_or_else(|| JsValue::from_str("agent not started"))
}

fn own_state(scope: &web_sys::ServiceWorkerGlobalScope) -> String {
    js_sys::Reflect::get(scope.as_ref(), &"serviceWorker".into())
        .and_then(|worker| js_sys::Reflect::get(&worker, &"state".into()))
        .ok()
        .and_then(|state| state.as_string())
        .unwrap_or_default()
}

fn registration_slots(scope: &web_sys::ServiceWorkerGlobalScope) -> RegistrationSlots {
    let registration = scope.registration();
    RegistrationSlots {
        installing: registration.installing().is_some(),
        waiting: registration.waiting().is_some(),
        active: registration.active().is_some(),
    }
}

fn js_failure(err: impl ToString) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Runs the install step. The returned promise rejects when the install fails.
#[wasm_bindgen]
pub fn run_install() -> Promise {
    future_to_promise(async move {
        let state = worker_state()?;
        state
            .agent
            .install()
            .await
            .map(|_| JsValue::UNDEFINED)
            .map_err(js_failure)
    })
}

/// Runs the activate step.
#[wasm_bindgen]
pub fn run_activate() -> Promise {
    future_to_promise(async move {
        let state = worker_state()?;
        state
            .agent
            .activate()
            .await
            .map(|_| JsValue::UNDEFINED)
            .map_err(js_failure)
    })
}

/// Handles a fetch event while it is still being dispatched.
#[wasm_bindgen]
pub fn on_fetch(event: web_sys::FetchEvent) {
    let Ok(state) = worker_state() else {
        return;
    };
    let Some((request, route)) = intercepted_route(&state, &event) else {
        return;
    };
    let response = answer(&state, request, route, &event);
    if let Err(err) = event.respond_with(&response) {
        logging::error!("respondWith rejected: {err:?}");
    }
}

/// Answers a fetch the loader already claimed before the module finished loading.
///
/// Requests the agent would not have intercepted go to the network unchanged.
#[wasm_bindgen]
pub fn respond_late(event: web_sys::FetchEvent) -> Promise {
    let state = match worker_state() {
        Ok(state) => state,
        Err(err) => return Promise::reject(&err),
    };
    match intercepted_route(&state, &event) {
        Some((request, route)) => answer(&state, request, route, &event),
        None => match worker_scope() {
            Ok(scope) => scope.fetch_with_request(&event.request()),
            Err(err) => Promise::reject(&err),
        },
    }
}

/// Handles a message posted by a window.
#[wasm_bindgen]
pub fn on_message(event: web_sys::ExtendableMessageEvent) {
    let Ok(state) = worker_state() else {
        return;
    };
    let Some(client) = event
        .source()
        .and_then(|source| source.dyn_into::<web_sys::Client>().ok())
    else {
        return;
    };
    let Ok(message) = serde_wasm_bindgen::from_value::<Value>(event.data()) else {
        return;
    };
    state
        .agent
        .handle_client_message(&ClientId(client.id()), &message);
}

fn intercepted_route(
    state: &WorkerState,
    event: &web_sys::FetchEvent,
) -> Option<(FetchRequest, FetchRoute)> {
    let request = request_from_web(&event.request());
    if !is_interceptable(&request, &state.origin) {
        return None;
    }
    match state.agent.route_fetch(&request) {
        FetchRoute::Bypass => None,
        route => Some((request, route)),
    }
}

/// Starts answering `request` and extends `event` until its follow-up work completes.
fn answer(
    state: &WorkerState,
    request: FetchRequest,
    route: FetchRoute,
    event: &web_sys::FetchEvent,
) -> Promise {
    let (deferred_tx, deferred_rx) = oneshot::channel::<DeferredWork>();
    let background = future_to_promise(async move {
        if let Ok(work) = deferred_rx.await {
            work.await;
        }
        Ok(JsValue::UNDEFINED)
    });
    let extendable: &web_sys::ExtendableEvent = event.as_ref();
    if let Err(err) = extendable.wait_until(&background) {
        logging::warn!("background work may be cut short: {err:?}");
    }

    let agent = Rc::clone(&state.agent);
    future_to_promise(async move {
        let intercepted = match route {
            FetchRoute::Share(payload) => agent.respond_share(payload).await,
            FetchRoute::CacheFirst => agent.respond_cache_first(&request).await.map_err(|err| {
                logging::warn!("{err}");
                js_failure(err)
            })?,
            FetchRoute::Bypass => return Err(JsValue::from_str("bypassed request")),
        };
        let (response, deferred) = intercepted.into_parts();
        if let Some(work) = deferred {
            let _ = deferred_tx.send(work);
        }
        platform_response(&response)
            .map(JsValue::from)
            .map_err(|err| JsValue::from_str(&err))
    })
}

fn platform_response(response: &FetchResponse) -> Result<web_sys::Response, String> {
    match redirect_target(response) {
        Some(location) => web_sys::Response::redirect(location)
            .map_err(|err| format!("building redirect to {location} failed: {err:?}")),
        None => response_to_web(response),
    }
}
