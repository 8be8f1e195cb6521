//! Cache Storage-backed asset cache.
//!
//! Each generation is one named cache. Entries are keyed by request URL, which the browser
//! resolves against the current origin, so root-relative manifest paths and absolute request
//! URLs address the same entry.

use platform_host::{AssetCacheFuture, AssetCacheStore, RequestIdentity, StoredResponse};

#[derive(Debug, Clone, Copy, Default)]
/// Browser asset cache backed by `caches` (Cache Storage).
pub struct WebAssetCache;

#[cfg(target_arch = "wasm32")]
async fn open_cache(generation: &str) -> Result<web_sys::Cache, String> {
    use wasm_bindgen::JsCast;

    let opened = crate::interop::await_promise(
        crate::interop::cache_storage()?.open(generation),
        "opening cache generation failed",
    )
    .await?;
    opened
        .dyn_into::<web_sys::Cache>()
        .map_err(|_| format!("caches.open({generation}) returned a non-cache value"))
}

impl AssetCacheStore for WebAssetCache {
    fn open<'a>(&'a self, generation: &'a str) -> AssetCacheFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                open_cache(generation).await.map(|_| ())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = generation;
                Ok(())
            }
        })
    }

    fn match_entry<'a>(
        &'a self,
        generation: &'a str,
        identity: &'a RequestIdentity,
    ) -> AssetCacheFuture<'a, Result<Option<StoredResponse>, String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                use wasm_bindgen::JsCast;

                let cache = open_cache(generation).await?;
                let found = crate::interop::await_promise(
                    cache.match_with_str(identity.url()),
                    "cache lookup failed",
                )
                .await?;
                if found.is_undefined() || found.is_null() {
                    return Ok(None);
                }
                let response = found
                    .dyn_into::<web_sys::Response>()
                    .map_err(|_| "cache lookup returned a non-response value".to_string())?;
                let converted = crate::interop::response_from_web(response).await?;
                Ok(Some(converted.snapshot()))
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = (generation, identity);
                Ok(None)
            }
        })
    }

    fn put_entry<'a>(
        &'a self,
        generation: &'a str,
        identity: &'a RequestIdentity,
        response: StoredResponse,
    ) -> AssetCacheFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let cache = open_cache(generation).await?;
                let web_response = crate::interop::response_to_web(&response.to_response())?;
                crate::interop::await_promise(
                    cache.put_with_str(identity.url(), &web_response),
                    "cache write failed",
                )
                .await
                .map(|_| ())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = (generation, identity, response);
                Ok(())
            }
        })
    }

    fn generations<'a>(&'a self) -> AssetCacheFuture<'a, Result<Vec<String>, String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let keys = crate::interop::await_promise(
                    crate::interop::cache_storage()?.keys(),
                    "listing cache generations failed",
                )
                .await?;
                Ok(js_sys::Array::from(&keys)
                    .iter()
                    .filter_map(|name| name.as_string())
                    .collect())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                Ok(Vec::new())
            }
        })
    }

    fn delete_generation<'a>(
        &'a self,
        generation: &'a str,
    ) -> AssetCacheFuture<'a, Result<bool, String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let deleted = crate::interop::await_promise(
                    crate::interop::cache_storage()?.delete(generation),
                    "deleting cache generation failed",
                )
                .await?;
                Ok(deleted.as_bool().unwrap_or(false))
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = generation;
                Ok(false)
            }
        })
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;
    use platform_host::CacheHandle;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn native_fallback_is_an_empty_cache() {
        let handle = block_on(CacheHandle::open(Rc::new(WebAssetCache), "gen")).expect("open");
        let hit = block_on(handle.match_request(&RequestIdentity::for_get("/"))).expect("lookup");
        assert_eq!(hit, None);
        assert_eq!(block_on(WebAssetCache.generations()).expect("list"), Vec::<String>::new());
    }
}
