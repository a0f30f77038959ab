//! Fixed-capacity least-recently-used map.
//!
//! Entries live in a slab (`Vec<Node>`) linked into a doubly linked list by
//! index; a `HashMap` maps keys to slab slots. `get` and `put` are O(1).
//! When full, `put` evicts exactly one entry: the least recently used.

use std::collections::HashMap;
use std::hash::Hash;

const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    map: HashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    /// Most recently used.
    head: usize,
    /// Least recently used.
    tail: usize,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// A cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Look up `key` and mark it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let slot = *self.map.get(key)?;
        self.detach(slot);
        self.push_front(slot);
        Some(&self.nodes[slot].value)
    }

    /// Look up `key` without touching the recency order.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.get(key).map(|&slot| &self.nodes[slot].value)
    }

    /// Insert or replace `key`. Returns the evicted entry, if the cache was
    /// full and `key` was new.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&slot) = self.map.get(&key) {
            self.nodes[slot].value = value;
            self.detach(slot);
            self.push_front(slot);
            return None;
        }

        if self.nodes.len() < self.capacity {
            let slot = self.nodes.len();
            self.nodes.push(Node {
                key: key.clone(),
                value,
                prev: NIL,
                next: NIL,
            });
            self.map.insert(key, slot);
            self.push_front(slot);
            return None;
        }

        // Reuse the least recently used slot.
        let slot = self.tail;
        self.detach(slot);
        let old_key = std::mem::replace(&mut self.nodes[slot].key, key.clone());
        let old_value = std::mem::replace(&mut self.nodes[slot].value, value);
        self.map.remove(&old_key);
        self.map.insert(key, slot);
        self.push_front(slot);
        Some((old_key, old_value))
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    fn detach(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }
        self.nodes[slot].prev = NIL;
        self.nodes[slot].next = NIL;
    }

    fn push_front(&mut self, slot: usize) {
        self.nodes[slot].prev = NIL;
        self.nodes[slot].next = self.head;
        if self.head != NIL {
            self.nodes[self.head].prev = slot;
        }
        self.head = slot;
        if self.tail == NIL {
            self.tail = slot;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let mut cache = LruCache::new(2);
        assert!(cache.put("a", 1).is_none());
        assert!(cache.put("b", 2).is_none());
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"c"), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_evicts_single_oldest() {
        let mut cache = LruCache::new(3);
        cache.put(1, "one");
        cache.put(2, "two");
        cache.put(3, "three");
        // Touch 1 so that 2 becomes the oldest.
        cache.get(&1);
        assert_eq!(cache.put(4, "four"), Some((2, "two")));
        assert_eq!(cache.len(), 3);
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert!(cache.contains(&3));
        assert!(cache.contains(&4));
    }

    #[test]
    fn test_replace_existing_key_does_not_evict() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert!(cache.put("a", 10).is_none());
        assert_eq!(cache.peek(&"a"), Some(&10));
        // "b" is now the oldest.
        assert_eq!(cache.put("c", 3), Some(("b", 2)));
    }

    #[test]
    fn test_peek_does_not_promote() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.peek(&"a");
        assert_eq!(cache.put("c", 3), Some(("a", 1)));
    }

    #[test]
    fn test_capacity_one() {
        let mut cache = LruCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put(1, 1);
        assert_eq!(cache.put(2, 2), Some((1, 1)));
        assert_eq!(cache.get(&2), Some(&2));
    }

    #[test]
    fn test_clear() {
        let mut cache = LruCache::new(4);
        cache.put(1, 1);
        cache.put(2, 2);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
        cache.put(3, 3);
        assert_eq!(cache.get(&3), Some(&3));
    }

    #[test]
    fn test_long_churn_keeps_recent_entries() {
        let mut cache = LruCache::new(8);
        for i in 0..100 {
            cache.put(i, i * 2);
        }
        assert_eq!(cache.len(), 8);
        for i in 92..100 {
            assert_eq!(cache.peek(&i), Some(&(i * 2)));
        }
        assert!(!cache.contains(&91));
    }
}
