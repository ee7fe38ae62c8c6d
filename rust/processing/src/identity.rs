// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-run identity caches.
//!
//! Each source object is converted at most once. A cache maps the source
//! identity to the converted value and counts how often it was asked for:
//! the first insertion counts one, every later lookup one more.

use std::hash::Hash;

use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    count: usize,
}

/// Source identity to converted value, with reference counts.
#[derive(Debug, Clone)]
pub struct IdentityCache<K, V> {
    entries: FxHashMap<K, Entry<V>>,
}

impl<K, V> Default for IdentityCache<K, V> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<K: Hash + Eq + Copy, V: Clone> IdentityCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, counting the reference on a hit.
    pub fn lookup(&mut self, key: K) -> Option<V> {
        self.entries.get_mut(&key).map(|entry| {
            entry.count += 1;
            entry.value.clone()
        })
    }

    /// Record the converted value for a first-seen key.
    ///
    /// Re-inserting an existing key replaces the value and keeps its count.
    pub fn insert(&mut self, key: K, value: V) {
        self.entries
            .entry(key)
            .and_modify(|entry| entry.value = value.clone())
            .or_insert(Entry { value, count: 1 });
    }

    /// Cached value without counting a reference
    pub fn peek(&self, key: K) -> Option<&V> {
        self.entries.get(&key).map(|entry| &entry.value)
    }

    pub fn contains(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    /// Times `key` was referenced; zero if never seen
    pub fn count(&self, key: K) -> usize {
        self.entries.get(&key).map_or(0, |entry| entry.count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
