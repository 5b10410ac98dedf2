// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Memoization of rule results.

use std::collections::HashMap;
use std::sync::Arc;

use log::trace;

use crate::config::CacheCapacity;
use crate::cst::CstNode;
use crate::parser_state::FarthestAttempt;

/// A rule invoked at a token index.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CacheKey {
    pub rule: &'static str,
    pub index: usize,
}

impl CacheKey {
    #[inline]
    pub fn new(rule: &'static str, index: usize) -> CacheKey {
        CacheKey { rule, index }
    }
}

/// What a rule invocation produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The rule matched up to token index `end` and built `node`.
    Matched { end: usize, node: Arc<CstNode> },
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
    pub outcome: Outcome,
    /// The farthest attempt made while the rule ran, its rule stack relative to the rule.
    pub farthest: Option<FarthestAttempt>,
}

/// Counters of one cache's lifetime.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub stores: usize,
    pub evictions: usize,
}

#[derive(Debug)]
struct Slot {
    key: CacheKey,
    entry: CacheEntry,
    prev: Option<usize>,
    next: Option<usize>,
}

/// A least-recently-used map from `CacheKey` to `CacheEntry`.
///
/// Slots live in a vector and are threaded into a recency list by index, head being the most
/// recently used. Lookups and stores are O(1); an evicted tail slot is reused in place.
///
/// # Examples
///
/// ```
/// # use pegcst::{CacheCapacity, CacheEntry, CacheKey, Outcome, PackratCache};
/// let mut cache = PackratCache::new(CacheCapacity::bounded(1));
/// let failed = || CacheEntry { outcome: Outcome::Failed, farthest: None };
///
/// cache.store(CacheKey::new("a", 0), failed());
/// cache.store(CacheKey::new("b", 0), failed());
///
/// assert!(cache.lookup(&CacheKey::new("a", 0)).is_none());
/// assert!(cache.lookup(&CacheKey::new("b", 0)).is_some());
/// assert_eq!(cache.stats().evictions, 1);
/// ```
#[derive(Debug)]
pub struct PackratCache {
    capacity: CacheCapacity,
    map: HashMap<CacheKey, usize>,
    slots: Vec<Slot>,
    head: Option<usize>,
    tail: Option<usize>,
    stats: CacheStats,
}

impl PackratCache {
    pub fn new(capacity: CacheCapacity) -> PackratCache {
        let reserved = match capacity {
            CacheCapacity::Bounded(capacity) => capacity.get().min(1024),
            CacheCapacity::Disabled | CacheCapacity::Unbounded => 0,
        };

        PackratCache {
            capacity,
            map: HashMap::with_capacity(reserved),
            slots: Vec::with_capacity(reserved),
            head: None,
            tail: None,
            stats: CacheStats::default(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> CacheCapacity {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Returns the entry for `key` and marks it most recently used.
    pub fn lookup(&mut self, key: &CacheKey) -> Option<&CacheEntry> {
        if self.capacity == CacheCapacity::Disabled {
            return None;
        }

        match self.map.get(key) {
            Some(&slot) => {
                self.stats.hits += 1;
                self.detach(slot);
                self.attach_front(slot);
                Some(&self.slots[slot].entry)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Inserts or replaces the entry for `key`, evicting the least recently used entry when
    /// the cache is full.
    pub fn store(&mut self, key: CacheKey, entry: CacheEntry) {
        let limit = match self.capacity {
            CacheCapacity::Disabled => return,
            CacheCapacity::Bounded(capacity) => Some(capacity.get()),
            CacheCapacity::Unbounded => None,
        };
        self.stats.stores += 1;

        if let Some(&slot) = self.map.get(&key) {
            self.slots[slot].entry = entry;
            self.detach(slot);
            self.attach_front(slot);
            return;
        }

        let full = limit.map_or(false, |limit| self.map.len() >= limit);
        let slot = match self.tail {
            Some(tail) if full => {
                self.detach(tail);
                let evicted = std::mem::replace(&mut self.slots[tail].key, key);
                self.map.remove(&evicted);
                self.slots[tail].entry = entry;
                self.stats.evictions += 1;
                trace!("evicted {} at token {}", evicted.rule, evicted.index);
                tail
            }
            _ => {
                self.slots.push(Slot {
                    key,
                    entry,
                    prev: None,
                    next: None,
                });
                self.slots.len() - 1
            }
        };

        self.map.insert(key, slot);
        self.attach_front(slot);
    }

    fn detach(&mut self, slot: usize) {
        let (prev, next) = (self.slots[slot].prev, self.slots[slot].next);

        match prev {
            Some(prev) => self.slots[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next].prev = prev,
            None => self.tail = prev,
        }

        self.slots[slot].prev = None;
        self.slots[slot].next = None;
    }

    fn attach_front(&mut self, slot: usize) {
        self.slots[slot].next = self.head;
        if let Some(head) = self.head {
            self.slots[head].prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed() -> CacheEntry {
        CacheEntry {
            outcome: Outcome::Failed,
            farthest: None,
        }
    }

    fn matched(end: usize) -> CacheEntry {
        CacheEntry {
            outcome: Outcome::Matched {
                end,
                node: Arc::new(CstNode::branch("r", vec![])),
            },
            farthest: None,
        }
    }

    fn key(rule: &'static str) -> CacheKey {
        CacheKey::new(rule, 0)
    }

    #[test]
    fn lookup_refreshes_recency() {
        let mut cache = PackratCache::new(CacheCapacity::bounded(2));
        cache.store(key("a"), failed());
        cache.store(key("b"), failed());
        assert!(cache.lookup(&key("a")).is_some());

        cache.store(key("c"), failed());

        assert!(cache.lookup(&key("b")).is_none());
        assert!(cache.lookup(&key("a")).is_some());
        assert!(cache.lookup(&key("c")).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn eviction_order_without_lookups() {
        let mut cache = PackratCache::new(CacheCapacity::bounded(3));
        for rule in ["a", "b", "c", "d", "e"] {
            cache.store(key(rule), failed());
        }

        assert!(cache.lookup(&key("a")).is_none());
        assert!(cache.lookup(&key("b")).is_none());
        for rule in ["c", "d", "e"] {
            assert!(cache.lookup(&key(rule)).is_some());
        }
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn replacing_keeps_size() {
        let mut cache = PackratCache::new(CacheCapacity::bounded(2));
        cache.store(key("a"), failed());
        cache.store(key("a"), matched(3));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup(&key("a")), Some(&matched(3)));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn keys_distinguish_index() {
        let mut cache = PackratCache::new(CacheCapacity::Unbounded);
        cache.store(CacheKey::new("a", 0), failed());
        cache.store(CacheKey::new("a", 1), matched(2));

        assert_eq!(cache.lookup(&CacheKey::new("a", 0)), Some(&failed()));
        assert_eq!(cache.lookup(&CacheKey::new("a", 1)), Some(&matched(2)));
    }

    #[test]
    fn unbounded_never_evicts() {
        let mut cache = PackratCache::new(CacheCapacity::Unbounded);
        for index in 0..10_000 {
            cache.store(CacheKey::new("a", index), failed());
        }

        assert_eq!(cache.len(), 10_000);
        assert_eq!(cache.stats().evictions, 0);
        assert!(cache.lookup(&CacheKey::new("a", 0)).is_some());
    }

    #[test]
    fn disabled_stores_nothing() {
        let mut cache = PackratCache::new(CacheCapacity::Disabled);
        cache.store(key("a"), failed());

        assert!(cache.is_empty());
        assert!(cache.lookup(&key("a")).is_none());
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn stats() {
        let mut cache = PackratCache::new(CacheCapacity::bounded(1));
        cache.lookup(&key("a"));
        cache.store(key("a"), failed());
        cache.lookup(&key("a"));
        cache.store(key("b"), failed());

        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                stores: 2,
                evictions: 1,
            }
        );
    }
}
