//! TTL Cache
//!
//! Generic keyed cache with fixed-TTL-since-write expiry and a bounded
//! entry count. Expiry is lazy: an expired entry is detected and dropped on
//! access, there is no sweeper thread. The cache is internally locked so it
//! can be shared across request handlers via `Arc`; a benign race where two
//! concurrent misses both compute and insert is accepted (idempotent
//! recomputation, last write wins).

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    /// Keys in insertion order, oldest first, for bounded eviction.
    insertion_order: VecDeque<K>,
}

/// Keyed cache with absolute-from-insertion expiry and
/// least-recently-inserted eviction once `max_entries` is exceeded.
pub struct TtlCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    ttl: Duration,
    max_entries: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache whose entries expire `ttl` after insertion and which
    /// holds at most `max_entries` entries (at least 1).
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                insertion_order: VecDeque::new(),
            }),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Look up `key`. An entry past its TTL behaves as a miss and is
    /// dropped.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.lock();

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.inserted_at.elapsed() >= self.ttl,
            None => return None,
        };

        if expired {
            debug!("cache entry expired, dropping");
            inner.entries.remove(key);
            inner.insertion_order.retain(|k| k != key);
            return None;
        }

        inner.entries.get(key).map(|e| e.value.clone())
    }

    /// Insert `value` under `key`, resetting its TTL. Evicts the oldest
    /// entries when the bound is exceeded.
    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.lock();

        if inner.entries.contains_key(&key) {
            inner.insertion_order.retain(|k| k != &key);
        }
        inner.insertion_order.push_back(key.clone());
        inner.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );

        while inner.entries.len() > self.max_entries {
            let Some(oldest) = inner.insertion_order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
            debug!("cache bound exceeded, evicted oldest entry");
        }
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.insertion_order.clear();
    }

    /// Number of stored entries, expired-but-unswept ones included.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned lock means a panic while holding it; the map itself is
    // still structurally sound, so recover the guard.
    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn cache(ttl_ms: u64, max: usize) -> TtlCache<String, u32> {
        TtlCache::new(Duration::from_millis(ttl_ms), max)
    }

    #[test]
    fn test_get_miss_on_empty() {
        let c = cache(1000, 10);
        assert_eq!(c.get(&"k".to_string()), None);
    }

    #[test]
    fn test_insert_then_hit() {
        let c = cache(1000, 10);
        c.insert("k".to_string(), 7);
        assert_eq!(c.get(&"k".to_string()), Some(7));
    }

    #[test]
    fn test_expired_entry_is_miss_and_dropped() {
        let c = cache(0, 10);
        c.insert("k".to_string(), 7);
        // TTL of zero expires immediately.
        assert_eq!(c.get(&"k".to_string()), None);
        assert!(c.is_empty());
    }

    #[test]
    fn test_entry_survives_within_ttl() {
        let c = cache(5000, 10);
        c.insert("k".to_string(), 7);
        thread::sleep(Duration::from_millis(5));
        assert_eq!(c.get(&"k".to_string()), Some(7));
    }

    #[test]
    fn test_reinsert_replaces_value() {
        let c = cache(1000, 10);
        c.insert("k".to_string(), 1);
        c.insert("k".to_string(), 2);
        assert_eq!(c.get(&"k".to_string()), Some(2));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_bounded_eviction_drops_oldest_inserted() {
        let c = cache(60_000, 2);
        c.insert("a".to_string(), 1);
        c.insert("b".to_string(), 2);
        c.insert("c".to_string(), 3);

        assert_eq!(c.len(), 2);
        assert_eq!(c.get(&"a".to_string()), None);
        assert_eq!(c.get(&"b".to_string()), Some(2));
        assert_eq!(c.get(&"c".to_string()), Some(3));
    }

    #[test]
    fn test_reinsert_refreshes_eviction_order() {
        let c = cache(60_000, 2);
        c.insert("a".to_string(), 1);
        c.insert("b".to_string(), 2);
        // Re-inserting "a" makes "b" the oldest.
        c.insert("a".to_string(), 10);
        c.insert("c".to_string(), 3);

        assert_eq!(c.get(&"a".to_string()), Some(10));
        assert_eq!(c.get(&"b".to_string()), None);
        assert_eq!(c.get(&"c".to_string()), Some(3));
    }

    #[test]
    fn test_clear() {
        let c = cache(1000, 10);
        c.insert("a".to_string(), 1);
        c.insert("b".to_string(), 2);
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.get(&"a".to_string()), None);
    }

    #[test]
    fn test_concurrent_access_does_not_corrupt() {
        use std::sync::Arc;

        let c = Arc::new(cache(60_000, 50));
        let mut handles = Vec::new();
        for t in 0..4 {
            let c = Arc::clone(&c);
            handles.push(thread::spawn(move || {
                for i in 0..100u32 {
                    let key = format!("k{}", i % 10);
                    c.insert(key.clone(), t * 1000 + i);
                    let _ = c.get(&key);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        // All surviving keys are among the 10 written ones.
        assert!(c.len() <= 10);
    }
}
