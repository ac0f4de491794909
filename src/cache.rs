use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Bounded in-memory cache where entries expire after a freshness window.
///
/// A stale entry behaves as a miss: the caller re-fetches and re-inserts,
/// which is the revalidation path. Eviction beyond the window is LRU.
pub struct TtlCache<K: Hash + Eq, V: Clone> {
    entries: LruCache<K, Entry<V>>,
    ttl: Duration,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to >= 1");
        Self {
            entries: LruCache::new(capacity),
            ttl,
        }
    }

    /// Value for `key` if present and still inside the freshness window.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let fresh = match self.entries.get(key) {
            Some(entry) => entry.stored_at.elapsed() < self.ttl,
            None => return None,
        };

        if fresh {
            self.entries.get(key).map(|entry| entry.value.clone())
        } else {
            self.entries.pop(key);
            None
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.entries.put(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[test]
    fn fresh_entries_hit() {
        let mut cache: TtlCache<&str, u32> = TtlCache::new(4, Duration::from_secs(60));
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"b"), None);
    }

    #[tokio::test]
    async fn entries_expire_after_the_window() {
        let mut cache: TtlCache<&str, u32> = TtlCache::new(4, Duration::from_millis(20));
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));

        sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_window_never_serves() {
        let mut cache: TtlCache<&str, u32> = TtlCache::new(4, Duration::ZERO);
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), None);
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let mut cache: TtlCache<u32, u32> = TtlCache::new(2, Duration::from_secs(60));
        cache.insert(1, 10);
        cache.insert(2, 20);
        assert_eq!(cache.get(&1), Some(10));

        cache.insert(3, 30);
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.get(&3), Some(30));
    }

    #[test]
    fn reinsert_refreshes_the_clock() {
        let mut cache: TtlCache<&str, u32> = TtlCache::new(4, Duration::from_secs(60));
        cache.insert("a", 1);
        cache.insert("a", 2);
        assert_eq!(cache.get(&"a"), Some(2));
        assert_eq!(cache.len(), 1);
    }
}
