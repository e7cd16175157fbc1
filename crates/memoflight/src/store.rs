// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-key storage of the most recent successful fetch result.
//!
//! The store holds values for the lifetime of the process and evaluates
//! expiry lazily at read time. It carries no coalescing logic of its own;
//! that lives in the flight registry.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

struct Entry<V> {
    value: V,
    cached_at: Instant,
}

/// Maps keys to their cached value and the instant it was stored.
///
/// A value is fresh while `now - cached_at < ttl`. Reads do not distinguish
/// "absent" from "expired"; both are misses. Writes overwrite unconditionally,
/// last writer wins.
pub(crate) struct EntryStore<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
    ttl: Duration,
}

impl<K, V> EntryStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub(crate) fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the value for `key` only if it exists and is still fresh at `now`.
    pub(crate) fn get(&self, key: &K, now: Instant) -> Option<V> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.cached_at) < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub(crate) fn insert(&self, key: K, value: V, now: Instant) {
        self.entries.write().insert(key, Entry { value, cached_at: now });
    }

    pub(crate) fn invalidate(&self, key: &K) {
        self.entries.write().remove(key);
    }

    pub(crate) fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of stored entries, counting ones past their TTL that have not
    /// been overwritten or invalidated yet.
    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}

impl<K, V> fmt::Debug for EntryStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryStore").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}
