//! Bounded LRU cache with per-entry TTL for validated keys.
//!
//! Entries are keyed by the *full* key string, not the public key id —
//! an attacker who guesses a key id must never be able to poison or
//! probe the cache.  Bounding both size and age limits how long a
//! revoked key can be honored from cache and caps memory under hostile
//! key-guessing traffic.
//!
//! Expiry is evaluated lazily on access; there is no background sweep.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::record::ValidatedKey;

/// Default maximum number of cached entries.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    value: ValidatedKey,
    expires_at: Instant,
    /// Recency stamp; higher is more recently used.
    stamp: u64,
}

struct CacheState {
    map: HashMap<String, CacheEntry>,
    clock: u64,
}

impl CacheState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Thread-safe LRU + TTL cache of validated keys.
pub struct ValidationCache {
    state: Mutex<CacheState>,
    capacity: usize,
    ttl: Duration,
}

impl ValidationCache {
    /// Create a cache with the default capacity (1000) and TTL (5 min).
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    /// Create a cache with explicit capacity and TTL.
    pub fn with_config(capacity: usize, ttl: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState {
                map: HashMap::new(),
                clock: 0,
            }),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Look up by full key, promoting the entry to most-recently-used.
    ///
    /// An expired entry is treated as absent and dropped on the spot.
    pub fn get(&self, full_key: &str) -> Option<ValidatedKey> {
        let mut state = self.state.lock();

        let expired = state.map.get(full_key)?.expires_at <= Instant::now();
        if expired {
            state.map.remove(full_key);
            return None;
        }

        let stamp = state.tick();
        let entry = state.map.get_mut(full_key)?;
        entry.stamp = stamp;
        Some(entry.value.clone())
    }

    /// Insert or refresh an entry, evicting the least-recently-used
    /// entry when at capacity.
    pub fn set(&self, full_key: &str, value: ValidatedKey) {
        let mut state = self.state.lock();

        if !state.map.contains_key(full_key) && state.map.len() >= self.capacity {
            if let Some(lru_key) = state
                .map
                .iter()
                .min_by_key(|(_, entry)| entry.stamp)
                .map(|(key, _)| key.clone())
            {
                state.map.remove(&lru_key);
            }
        }

        let stamp = state.tick();
        let expires_at = Instant::now() + self.ttl;
        state.map.insert(
            full_key.to_string(),
            CacheEntry {
                value,
                expires_at,
                stamp,
            },
        );
    }

    /// Remove an entry by full key, or every entry for a key id.
    ///
    /// Revocation flows usually only know the public key id; the cached
    /// projections carry it, so a sweep finds the matching entries
    /// without the plaintext key.
    pub fn invalidate(&self, key_or_id: &str) {
        let mut state = self.state.lock();
        state.map.remove(key_or_id);
        state.map.retain(|_, entry| entry.value.key_id != key_or_id);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.state.lock().map.clear();
    }

    /// Number of entries currently held (expired ones included until
    /// they are touched).
    pub fn len(&self) -> usize {
        self.state.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ValidationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apikey::record::{ApiKeyRecord, Environment, KeyOwner};
    use uuid::Uuid;

    fn validated(key_id: &str) -> ValidatedKey {
        ApiKeyRecord::new(
            KeyOwner::Application(Uuid::new_v4()),
            key_id,
            "digest",
            "test key",
            Environment::Test,
            vec![],
        )
        .project()
    }

    #[test]
    fn get_returns_inserted_value() {
        let cache = ValidationCache::new();
        cache.set("np_test_k1_secret", validated("k1"));

        let hit = cache.get("np_test_k1_secret").expect("hit");
        assert_eq!(hit.key_id, "k1");
    }

    #[test]
    fn miss_on_unknown_key() {
        let cache = ValidationCache::new();
        assert!(cache.get("np_test_nope").is_none());
    }

    #[test]
    fn expired_entries_are_absent() {
        let cache = ValidationCache::with_config(10, Duration::from_millis(0));
        cache.set("np_test_k1_secret", validated("k1"));

        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("np_test_k1_secret").is_none());
        assert!(cache.is_empty(), "expired entry is dropped on access");
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cache = ValidationCache::with_config(2, Duration::from_secs(60));
        cache.set("key-a", validated("a"));
        cache.set("key-b", validated("b"));

        // Touch a so b becomes the LRU entry.
        cache.get("key-a");
        cache.set("key-c", validated("c"));

        assert!(cache.get("key-a").is_some());
        assert!(cache.get("key-b").is_none(), "LRU entry evicted");
        assert!(cache.get("key-c").is_some());
    }

    #[test]
    fn reinserting_existing_key_does_not_evict() {
        let cache = ValidationCache::with_config(2, Duration::from_secs(60));
        cache.set("key-a", validated("a"));
        cache.set("key-b", validated("b"));
        cache.set("key-a", validated("a"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("key-b").is_some());
    }

    #[test]
    fn invalidate_by_full_key() {
        let cache = ValidationCache::new();
        cache.set("np_test_k1_secret", validated("k1"));

        cache.invalidate("np_test_k1_secret");
        assert!(cache.get("np_test_k1_secret").is_none());
    }

    #[test]
    fn invalidate_by_key_id_sweeps_entries() {
        let cache = ValidationCache::new();
        cache.set("np_test_k1_secret", validated("k1"));
        cache.set("np_test_k2_secret", validated("k2"));

        cache.invalidate("k1");
        assert!(cache.get("np_test_k1_secret").is_none());
        assert!(cache.get("np_test_k2_secret").is_some());
    }

    #[test]
    fn clear_drops_everything() {
        let cache = ValidationCache::new();
        cache.set("key-a", validated("a"));
        cache.set("key-b", validated("b"));

        cache.clear();
        assert!(cache.is_empty());
    }
}
