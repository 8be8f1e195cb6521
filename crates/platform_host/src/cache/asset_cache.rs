//! Versioned asset cache contracts, generation handles, and the in-memory adapter.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    fmt,
    future::Future,
    pin::Pin,
    rc::Rc,
};

use crate::fetch::types::{FetchRequest, StoredResponse, METHOD_GET, STATUS_OK};

/// Object-safe boxed future used by [`AssetCacheStore`] async methods.
pub type AssetCacheFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Normalized cache key for a `GET` request.
///
/// Only `GET` identities can be constructed, so non-`GET` requests cannot reach a cache write.
pub struct RequestIdentity {
    url: String,
}

impl RequestIdentity {
    /// Builds the identity of a `GET` request for `url`.
    pub fn for_get(url: &str) -> Self {
        Self {
            url: normalize_request_url(url),
        }
    }

    /// Returns the identity of `request`, or `None` when it is not a `GET`.
    pub fn from_request(request: &FetchRequest) -> Option<Self> {
        request.is_get().then(|| Self::for_get(&request.url))
    }

    /// Method component of the identity (always `GET`).
    pub const fn method(&self) -> &'static str {
        METHOD_GET
    }

    /// Normalized URL component of the identity.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.url)
    }
}

/// Normalizes a request URL for cache lookups: surrounding whitespace and any fragment are
/// dropped, the query string is kept verbatim.
pub fn normalize_request_url(url: &str) -> String {
    let trimmed = url.trim();
    match trimmed.split_once('#') {
        Some((without_fragment, _)) => without_fragment.to_string(),
        None => trimmed.to_string(),
    }
}

/// Host cache storage organized as named generations of request/response entries.
pub trait AssetCacheStore {
    /// Opens `generation`, creating it when absent. Idempotent.
    fn open<'a>(&'a self, generation: &'a str) -> AssetCacheFuture<'a, Result<(), String>>;

    /// Looks up `identity` in `generation`.
    fn match_entry<'a>(
        &'a self,
        generation: &'a str,
        identity: &'a RequestIdentity,
    ) -> AssetCacheFuture<'a, Result<Option<StoredResponse>, String>>;

    /// Stores `response` under `identity` in `generation`, replacing any prior entry.
    fn put_entry<'a>(
        &'a self,
        generation: &'a str,
        identity: &'a RequestIdentity,
        response: StoredResponse,
    ) -> AssetCacheFuture<'a, Result<(), String>>;

    /// Lists every generation currently present.
    fn generations<'a>(&'a self) -> AssetCacheFuture<'a, Result<Vec<String>, String>>;

    /// Deletes `generation` and all of its entries. Returns whether it existed.
    fn delete_generation<'a>(
        &'a self,
        generation: &'a str,
    ) -> AssetCacheFuture<'a, Result<bool, String>>;
}

#[derive(Clone)]
/// Open handle to one cache generation.
pub struct CacheHandle {
    store: Rc<dyn AssetCacheStore>,
    generation: String,
}

impl fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheHandle")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl CacheHandle {
    /// Opens (creating if needed) `generation` in `store`.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cache cannot be opened.
    pub async fn open(
        store: Rc<dyn AssetCacheStore>,
        generation: impl Into<String>,
    ) -> Result<Self, String> {
        let generation = generation.into();
        store.open(&generation).await?;
        Ok(Self { store, generation })
    }

    /// Generation id this handle reads from and writes to.
    pub fn generation(&self) -> &str {
        &self.generation
    }

    /// Looks up a stored response.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cache lookup fails.
    pub async fn match_request(
        &self,
        identity: &RequestIdentity,
    ) -> Result<Option<StoredResponse>, String> {
        self.store.match_entry(&self.generation, identity).await
    }

    /// Stores a response snapshot.
    ///
    /// # Errors
    ///
    /// Rejects snapshots whose status is not `200`, and propagates host write failures.
    pub async fn put(
        &self,
        identity: &RequestIdentity,
        response: StoredResponse,
    ) -> Result<(), String> {
        if response.status() != STATUS_OK {
            return Err(format!(
                "refusing to cache {identity}: status {} is not {STATUS_OK}",
                response.status()
            ));
        }
        self.store
            .put_entry(&self.generation, identity, response)
            .await
    }
}

type Generation = HashMap<RequestIdentity, StoredResponse>;

#[derive(Debug, Default)]
struct MemoryAssetCacheState {
    generations: BTreeMap<String, Generation>,
    writes: Vec<(String, RequestIdentity)>,
}

#[derive(Debug, Clone, Default)]
/// In-memory asset cache adapter that also records every write for assertions.
pub struct MemoryAssetCache {
    inner: Rc<RefCell<MemoryAssetCacheState>>,
}

impl MemoryAssetCache {
    /// Returns every `(generation, identity)` write in order.
    pub fn write_log(&self) -> Vec<(String, RequestIdentity)> {
        self.inner.borrow().writes.clone()
    }

    /// Returns the number of entries stored in `generation`.
    pub fn entry_count(&self, generation: &str) -> usize {
        self.inner
            .borrow()
            .generations
            .get(generation)
            .map_or(0, HashMap::len)
    }
}

impl AssetCacheStore for MemoryAssetCache {
    fn open<'a>(&'a self, generation: &'a str) -> AssetCacheFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner
                .borrow_mut()
                .generations
                .entry(generation.to_string())
                .or_default();
            Ok(())
        })
    }

    fn match_entry<'a>(
        &'a self,
        generation: &'a str,
        identity: &'a RequestIdentity,
    ) -> AssetCacheFuture<'a, Result<Option<StoredResponse>, String>> {
        Box::pin(async move {
            Ok(self
                .inner
                .borrow()
                .generations
                .get(generation)
                .and_then(|entries| entries.get(identity))
                .cloned())
        })
    }

    fn put_entry<'a>(
        &'a self,
        generation: &'a str,
        identity: &'a RequestIdentity,
        response: StoredResponse,
    ) -> AssetCacheFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state
                .generations
                .entry(generation.to_string())
                .or_default()
                .insert(identity.clone(), response);
            state.writes.push((generation.to_string(), identity.clone()));
            Ok(())
        })
    }

    fn generations<'a>(&'a self) -> AssetCacheFuture<'a, Result<Vec<String>, String>> {
        Box::pin(async move { Ok(self.inner.borrow().generations.keys().cloned().collect()) })
    }

    fn delete_generation<'a>(
        &'a self,
        generation: &'a str,
    ) -> AssetCacheFuture<'a, Result<bool, String>> {
        Box::pin(async move {
            Ok(self
                .inner
                .borrow_mut()
                .generations
                .remove(generation)
                .is_some())
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Cache adapter that stores nothing, for hosts without cache storage.
pub struct NoopAssetCache;

impl AssetCacheStore for NoopAssetCache {
    fn open<'a>(&'a self, _generation: &'a str) -> AssetCacheFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn match_entry<'a>(
        &'a self,
        _generation: &'a str,
        _identity: &'a RequestIdentity,
    ) -> AssetCacheFuture<'a, Result<Option<StoredResponse>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn put_entry<'a>(
        &'a self,
        _generation: &'a str,
        _identity: &'a RequestIdentity,
        _response: StoredResponse,
    ) -> AssetCacheFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn generations<'a>(&'a self) -> AssetCacheFuture<'a, Result<Vec<String>, String>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn delete_generation<'a>(
        &'a self,
        _generation: &'a str,
    ) -> AssetCacheFuture<'a, Result<bool, String>> {
        Box::pin(async { Ok(false) })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fetch::types::FetchResponse;

    fn ok_snapshot(body: &[u8]) -> StoredResponse {
        FetchResponse::new(200, body.to_vec()).snapshot()
    }

    #[test]
    fn identity_is_only_built_for_get_and_ignores_fragments() {
        let get = FetchRequest::get("https://app.test/index.html#top");
        let post = FetchRequest::new("POST", "https://app.test/index.html");

        assert_eq!(
            RequestIdentity::from_request(&get).map(|id| id.url().to_string()),
            Some("https://app.test/index.html".to_string())
        );
        assert_eq!(RequestIdentity::from_request(&post), None);
        assert_eq!(
            RequestIdentity::for_get("/a?x=1").to_string(),
            "GET /a?x=1".to_string()
        );
    }

    #[test]
    fn open_is_idempotent_and_put_overwrites_within_generation() {
        let cache = MemoryAssetCache::default();
        let store: Rc<dyn AssetCacheStore> = Rc::new(cache.clone());
        let handle = block_on(CacheHandle::open(Rc::clone(&store), "shell-v1")).expect("open");
        block_on(CacheHandle::open(store, "shell-v1")).expect("reopen");

        let identity = RequestIdentity::for_get("/index.html");
        block_on(handle.put(&identity, ok_snapshot(b"old"))).expect("put old");
        block_on(handle.put(&identity, ok_snapshot(b"new"))).expect("put new");

        let stored = block_on(handle.match_request(&identity))
            .expect("match")
            .expect("entry");
        assert_eq!(stored.body(), b"new");
        assert_eq!(cache.entry_count("shell-v1"), 1);
    }

    #[test]
    fn handle_put_rejects_non_ok_snapshots() {
        let cache = MemoryAssetCache::default();
        let handle =
            block_on(CacheHandle::open(Rc::new(cache.clone()), "shell-v1")).expect("open");

        let not_found = FetchResponse::new(404, Vec::new()).snapshot();
        let err = block_on(handle.put(&RequestIdentity::for_get("/gone"), not_found))
            .expect_err("404 must not be cached");
        assert!(err.contains("404"));
        assert!(cache.write_log().is_empty());
    }

    #[test]
    fn delete_generation_removes_entries_and_reports_presence() {
        let cache = MemoryAssetCache::default();
        let store: &dyn AssetCacheStore = &cache;
        block_on(store.open("shell-v1")).expect("open v1");
        block_on(store.open("shell-v2")).expect("open v2");
        block_on(store.put_entry("shell-v1", &RequestIdentity::for_get("/"), ok_snapshot(b"")))
            .expect("put");

        assert!(block_on(store.delete_generation("shell-v1")).expect("delete"));
        assert!(!block_on(store.delete_generation("shell-v1")).expect("delete again"));
        assert_eq!(
            block_on(store.generations()).expect("list"),
            vec!["shell-v2".to_string()]
        );
        assert_eq!(
            block_on(store.match_entry("shell-v1", &RequestIdentity::for_get("/"))).expect("match"),
            None
        );
    }

    #[test]
    fn concurrent_puts_keep_every_key_and_last_write_wins() {
        let cache = MemoryAssetCache::default();
        let app = RequestIdentity::for_get("/app.js");
        let style = RequestIdentity::for_get("/style.css");
        block_on(cache.open("shell-v1")).expect("open");

        let (first, second, third) = block_on(futures::future::join3(
            cache.put_entry("shell-v1", &app, ok_snapshot(b"app v1")),
            cache.put_entry("shell-v1", &style, ok_snapshot(b"style")),
            cache.put_entry("shell-v1", &app, ok_snapshot(b"app v2")),
        ));
        first.expect("put app");
        second.expect("put style");
        third.expect("put app again");

        assert_eq!(cache.entry_count("shell-v1"), 2);
        assert_eq!(
            block_on(cache.match_entry("shell-v1", &app)).expect("match"),
            Some(ok_snapshot(b"app v2"))
        );
        assert_eq!(
            block_on(cache.match_entry("shell-v1", &style)).expect("match"),
            Some(ok_snapshot(b"style"))
        );
    }

    #[test]
    fn noop_cache_accepts_writes_and_never_matches() {
        let cache = NoopAssetCache;
        let store: &dyn AssetCacheStore = &cache;
        let identity = RequestIdentity::for_get("/index.html");
        block_on(store.open("shell-v1")).expect("open");
        block_on(store.put_entry("shell-v1", &identity, ok_snapshot(b"<html>")))
            .expect("put");
        assert_eq!(block_on(store.match_entry("shell-v1", &identity)), Ok(None));
        assert_eq!(block_on(store.generations()), Ok(Vec::new()));
    }
}
