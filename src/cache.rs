//! Time-to-live cache for generation results.
//!
//! An explicit key → (value, inserted-at) store with expiry checked on
//! every read, instead of ad hoc timestamp comparisons scattered through
//! request handlers. Interior locking makes a shared `Arc<TtlCache>` safe
//! across concurrent callers.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// A map whose entries expire `ttl` after insertion.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ideaforge::cache::TtlCache;
///
/// let cache: TtlCache<String, String> = TtlCache::new(Duration::from_secs(60));
/// cache.insert("k".into(), "v".into());
/// assert_eq!(cache.get(&"k".to_string()), Some("v".to_string()));
/// ```
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// Create an empty cache with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert a value, resetting the entry's clock.
    pub fn insert(&self, key: K, value: V) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Get a live value. Expired entries are removed and report `None`.
    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entries = match self.entries.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match entries.get(key) {
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {} // expired; fall through to remove
                None => return None,
            }
        }
        self.remove(key);
        None
    }

    /// Remove an entry regardless of age.
    pub fn remove(&self, key: &K) -> Option<V> {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.remove(key).map(|e| e.value)
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
    }

    /// Number of stored entries, counting expired ones not yet purged.
    pub fn len(&self) -> usize {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.len()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"b"), None);
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), None);
        // The expired read also evicted the entry
        assert!(cache.is_empty());
    }

    #[test]
    fn reinsert_resets_clock() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", 1);
        cache.insert("a", 2);
        assert_eq!(cache.get(&"a"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn remove_returns_value() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", 7);
        assert_eq!(cache.remove(&"a"), Some(7));
        assert_eq!(cache.remove(&"a"), None);
    }

    #[test]
    fn purge_drops_only_expired() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.purge_expired();
        assert!(cache.is_empty());

        let fresh = TtlCache::new(Duration::from_secs(60));
        fresh.insert("a", 1);
        fresh.purge_expired();
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn shared_across_threads() {
        use std::sync::Arc;

        let cache = Arc::new(TtlCache::new(Duration::from_secs(60)));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.insert(i, i * 10);
                    cache.get(&i)
                })
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), Some(i * 10));
        }
    }
}
