//! A small bounded least-recently-used cache. Every cache in the crate (window
//! slices, tile lookups, projections, hit results) is one of these, owned by
//! the component that uses it.

use fnv::FnvBuildHasher;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// A bounded map that evicts the least recently used entry once it's full.
/// Entries are kept in an insertion-ordered map where the front is the oldest
/// entry and the back is the most recently used one. Every hit moves the entry
/// to the back. Capacities in this crate are small (tens to a few thousand
/// entries), so the linear cost of reordering doesn't matter.
///
/// A capacity of zero disables caching entirely: inserts are dropped and every
/// lookup misses.
#[derive(Clone, Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    entries: IndexMap<K, V, FnvBuildHasher>,
    hits: u64,
    misses: u64,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: IndexMap::with_capacity_and_hasher(
                capacity,
                FnvBuildHasher::default(),
            ),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up an entry, marking it as the most recently used one. Counts
    /// towards the hit/miss statistics.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.entries.shift_remove(key) {
            Some(value) => {
                self.hits += 1;
                self.entries.insert(key.clone(), value);
                self.entries.get(key)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Check for an entry without touching recency or statistics
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert an entry as the most recently used one, evicting the least
    /// recently used entry if the cache is full.
    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.shift_remove(&key).is_none()
            && self.entries.len() >= self.capacity
        {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, value);
    }

    /// Get a copy of the value for a key, computing and caching it on a miss
    pub fn get_or_insert_with(&mut self, key: K, f: impl FnOnce() -> V) -> V
    where
        V: Clone,
    {
        if let Some(value) = self.get(&key) {
            return value.clone();
        }
        let value = f();
        self.insert(key, value.clone());
        value
    }

    /// Drop every entry and reset the statistics
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of this cache's usage statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.entries.len(),
            capacity: self.capacity,
        }
    }
}

/// Usage statistics for a single cache. Statistics reset whenever the cache
/// is cleared.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups that were hits, in `[0, 1]`. Zero if there have
    /// been no lookups at all.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        // Touch "a" so "b" becomes the oldest
        assert_eq!(cache.get(&"a"), Some(&1));
        cache.insert("c", 3);

        assert!(cache.contains_key(&"a"));
        assert!(!cache.contains_key(&"b"));
        assert!(cache.contains_key(&"c"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_reinsert_does_not_evict() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), Some(&10));
        assert_eq!(cache.get(&"b"), Some(&2));
    }

    #[test]
    fn test_stats() {
        let mut cache = LruCache::new(4);
        cache.insert(1, "one");
        assert!(cache.get(&1).is_some());
        assert!(cache.get(&2).is_none());
        assert!(cache.get(&1).is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.len, 1);
        assert_eq!(stats.capacity, 4);
        assert_approx_eq!(stats.hit_ratio(), 2.0 / 3.0);

        cache.clear();
        assert_eq!(cache.stats(), CacheStats { capacity: 4, ..Default::default() });
    }

    #[test]
    fn test_get_or_insert_with() {
        let mut cache = LruCache::new(1);
        let mut calls = 0;
        for _ in 0..3 {
            let value = cache.get_or_insert_with(7, || {
                calls += 1;
                49
            });
            assert_eq!(value, 49);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_zero_capacity() {
        let mut cache = LruCache::new(0);
        cache.insert("a", 1);
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_insert_with("b", || 2), 2);
        assert!(cache.is_empty());
        assert!(cache.get(&"a").is_none());
    }
}
