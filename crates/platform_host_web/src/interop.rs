//! Shared `wasm32` glue: global-scope lookup, promise awaiting, and conversions between
//! `web_sys` request/response objects and [`platform_host`] fetch types.

use js_sys::{Array, Object, Promise, Reflect, Uint8Array};
use platform_host::{FetchRequest, FetchResponse};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

pub(crate) fn js_error(context: &str, err: JsValue) -> String {
    match err.dyn_ref::<js_sys::Error>() {
        Some(error) => format!("{context}: {}", String::from(error.message())),
        None => format!("{context}: {err:?}"),
    }
}

pub(crate) async fn await_promise(promise: Promise, context: &str) -> Result<JsValue, String> {
    JsFuture::from(promise)
        .await
        .map_err(|err| js_error(context, err))
}

pub(crate) fn worker_scope() -> Result<web_sys::ServiceWorkerGlobalScope, String> {
    js_sys::global()
        .dyn_into::<web_sys::ServiceWorkerGlobalScope>()
        .map_err(|_| "not running inside a service worker".to_string())
}

pub(crate) fn cache_storage() -> Result<web_sys::CacheStorage, String> {
    let global = js_sys::global();
    if let Some(scope) = global.dyn_ref::<web_sys::WorkerGlobalScope>() {
        return scope
            .caches()
            .map_err(|err| js_error("CacheStorage unavailable", err));
    }
    if let Some(window) = global.dyn_ref::<web_sys::Window>() {
        return window
            .caches()
            .map_err(|err| js_error("CacheStorage unavailable", err));
    }
    Err("CacheStorage unavailable in this context".to_string())
}

pub(crate) fn set_timeout(callback: &js_sys::Function, millis: u32) -> Result<i32, String> {
    let timeout = i32::try_from(millis).unwrap_or(i32::MAX);
    let global = js_sys::global();
    if let Some(scope) = global.dyn_ref::<web_sys::WorkerGlobalScope>() {
        return scope
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback, timeout)
            .map_err(|err| js_error("setTimeout failed", err));
    }
    if let Some(window) = global.dyn_ref::<web_sys::Window>() {
        return window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback, timeout)
            .map_err(|err| js_error("setTimeout failed", err));
    }
    Err("no timer in this context".to_string())
}

pub(crate) fn set_property(target: &Object, key: &str, value: &JsValue) -> Result<(), String> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|err| js_error(&format!("setting `{key}` failed"), err))
}

fn headers_to_vec(headers: &web_sys::Headers) -> Vec<(String, String)> {
    let Ok(Some(entries)) = js_sys::try_iter(headers.as_ref()) else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let pair: Array = entry.dyn_into().ok()?;
            Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
        })
        .collect()
}

fn headers_from_slice(headers: &[(String, String)]) -> Result<web_sys::Headers, String> {
    let target = web_sys::Headers::new().map_err(|err| js_error("Headers unavailable", err))?;
    for (name, value) in headers {
        target
            .append(name, value)
            .map_err(|err| js_error(&format!("invalid header `{name}`"), err))?;
    }
    Ok(target)
}

/// Copies the method, URL, and headers of a platform request.
pub fn request_from_web(request: &web_sys::Request) -> FetchRequest {
    FetchRequest {
        method: request.method(),
        url: request.url(),
        headers: headers_to_vec(&request.headers()),
    }
}

pub(crate) fn request_to_web(request: &FetchRequest) -> Result<web_sys::Request, String> {
    let init = Object::new();
    set_property(&init, "method", &JsValue::from_str(&request.method))?;
    set_property(&init, "headers", &headers_from_slice(&request.headers)?)?;
    web_sys::Request::new_with_str_and_init(&request.url, init.unchecked_ref())
        .map_err(|err| js_error(&format!("building request for {}", request.url), err))
}

pub(crate) async fn response_from_web(response: web_sys::Response) -> Result<FetchResponse, String> {
    let buffer = response
        .array_buffer()
        .map_err(|err| js_error("reading response body failed", err))?;
    let body = Uint8Array::new(&await_promise(buffer, "reading response body failed").await?);
    let mut converted = FetchResponse::new(response.status(), body.to_vec());
    converted.status_text = response.status_text();
    converted.headers = headers_to_vec(&response.headers());
    Ok(converted)
}

/// Builds a platform response from a [`FetchResponse`].
///
/// # Errors
///
/// Returns an error when the status is outside the range the platform accepts or a header
/// is invalid.
pub fn response_to_web(response: &FetchResponse) -> Result<web_sys::Response, String> {
    if !(200..=599).contains(&response.status) {
        return Err(format!("status {} cannot be constructed", response.status));
    }
    let init = Object::new();
    set_property(&init, "status", &JsValue::from(response.status))?;
    set_property(&init, "statusText", &JsValue::from_str(&response.status_text))?;
    set_property(&init, "headers", &headers_from_slice(&response.headers)?)?;
    let null_body = matches!(response.status, 204 | 205 | 304) || response.body().is_empty();
    let result = if null_body {
        web_sys::Response::new_with_opt_u8_array_and_init(None, init.unchecked_ref())
    } else {
        let mut body = response.body().to_vec();
        web_sys::Response::new_with_opt_u8_array_and_init(Some(&mut body), init.unchecked_ref())
    };
    result.map_err(|err| js_error("building response failed", err))
}
