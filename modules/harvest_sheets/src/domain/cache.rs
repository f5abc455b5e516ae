//! Expiring read cache
//!
//! Entries expire lazily: an expired entry is only removed when a read finds
//! it. There is no background sweep.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

struct CacheEntry<V> {
    data: V,
    /// `None` never expires
    expires_at: Option<Instant>,
}

/// Named TTL cache keyed by derived strings
pub struct TtlCache<V> {
    name: &'static str,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// A zero `ttl` stores entries that never expire
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fresh value for `key`; an expired entry is evicted and reported as a miss
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => entry
                .expires_at
                .is_some_and(|deadline| Instant::now() >= deadline),
        };

        if expired {
            entries.remove(key);
            tracing::debug!(cache = self.name, key, "cache entry expired");
            return None;
        }

        entries.get(key).map(|entry| entry.data.clone())
    }

    /// Store `data` under `key`, overwriting any previous entry
    pub fn insert(&self, key: impl Into<String>, data: V) {
        let expires_at = (!self.ttl.is_zero()).then(|| Instant::now() + self.ttl);
        self.entries
            .lock()
            .insert(key.into(), CacheEntry { data, expires_at });
    }

    /// Drop the entry for `key`; returns whether one was present
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_hit_before_expiry() {
        let cache = TtlCache::new("items", Duration::from_secs(10));
        cache.insert("V123", 7u32);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(cache.get("V123"), Some(7));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_at_deadline_evicts() {
        let cache = TtlCache::new("items", Duration::from_secs(10));
        cache.insert("V123", 7u32);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(cache.get("V123"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_stays_until_read() {
        let cache = TtlCache::new("tabs", Duration::from_secs(1));
        cache.insert("a", "x".to_string());
        cache.insert("b", "y".to_string());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_never_expires() {
        let cache = TtlCache::new("forever", Duration::ZERO);
        cache.insert("k", 1u8);

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert_eq!(cache.get("k"), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_restarts_ttl() {
        let cache = TtlCache::new("packing", Duration::from_secs(30));
        cache.insert("or::X", 1u8);
        tokio::time::advance(Duration::from_secs(20)).await;
        cache.insert("or::X", 2u8);
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(cache.get("or::X"), Some(2));
    }

    #[test]
    fn test_invalidate() {
        let cache = TtlCache::new("items", Duration::from_secs(10));
        cache.insert("k", 1u8);
        assert!(cache.invalidate("k"));
        assert!(!cache.invalidate("k"));
        assert_eq!(cache.get("k"), None);
    }
}
