//! Bounded memoization cache for synthesized icons.
//!
//! Many clusters share a composition (one lost item, two found items, ...),
//! so their descriptors are identical. The engine keeps them in a small
//! LRU keyed by [`ClusterComposition`]; the synthesizer itself stays a
//! pure function. With at most a few hundred distinct compositions on a
//! campus map, the O(n) eviction scan is acceptable and simpler than a
//! linked list.

use std::collections::HashMap;

use crate::icons::{synthesize, ClusterComposition, IconDescriptor};
use crate::Cluster;

/// LRU cache of icon descriptors keyed by cluster composition.
#[derive(Debug)]
pub struct IconCache {
    capacity: usize,
    entries: HashMap<ClusterComposition, CacheEntry>,
    access_counter: u64,
}

#[derive(Debug)]
struct CacheEntry {
    descriptor: IconDescriptor,
    last_access: u64,
}

impl IconCache {
    /// Create a cache holding at most `capacity` compositions.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::with_capacity(capacity.max(1)),
            access_counter: 0,
        }
    }

    /// Descriptor for the cluster, synthesized on first sight of its
    /// composition and cloned out of the cache afterwards.
    pub fn get_or_synthesize(&mut self, cluster: &Cluster) -> IconDescriptor {
        let key = ClusterComposition::of(cluster);

        self.access_counter += 1;
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_access = self.access_counter;
            return entry.descriptor.clone();
        }

        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        let descriptor = synthesize(cluster);
        self.entries.insert(
            key,
            CacheEntry {
                descriptor: descriptor.clone(),
                last_access: self.access_counter,
            },
        );
        descriptor
    }

    /// Number of cached compositions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached descriptor.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.access_counter = 0;
    }

    /// Evict the least recently used composition.
    fn evict_oldest(&mut self) {
        let oldest_key = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(k, _)| *k);

        if let Some(key) = oldest_key {
            self.entries.remove(&key);
        }
    }
}

impl Default for IconCache {
    fn default() -> Self {
        Self::new(256)
    }
}
