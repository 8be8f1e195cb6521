//! Asset-cache domain contracts and lightweight test adapters.

mod asset_cache;

pub use asset_cache::{
    normalize_request_url, AssetCacheFuture, AssetCacheStore, CacheHandle, MemoryAssetCache,
    NoopAssetCache, RequestIdentity,
};
