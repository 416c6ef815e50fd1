//! Key-value store backing the catalog. Values are kept as JSON so that any store, in
//! memory or remote, can hold them.
use moka::Expiry;
use moka::sync::Cache;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Injected key-value capability. Implementations must give read-your-writes within
/// a process and must never return an entry past its expiry.
pub trait CacheStore: Send + Sync {
    fn has(&self, key: &str) -> bool;
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, value: Value, ttl: Duration);
}

#[derive(Clone, Debug)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

struct EntryExpiry;

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.expires_at.saturating_duration_since(created_at))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // A write replaces the whole entry, expiry included.
        Some(entry.expires_at.saturating_duration_since(updated_at))
    }
}

/// In-process store with per-entry expiry.
pub struct MemoryCacheStore {
    cache: Cache<String, CacheEntry>,
}

impl MemoryCacheStore {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();

        MemoryCacheStore { cache }
    }
}

impl CacheStore for MemoryCacheStore {
    fn has(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.cache.get(key).map(|entry| entry.value)
    }

    fn put(&self, key: &str, value: Value, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.cache.insert(key.to_string(), entry);
    }
}
