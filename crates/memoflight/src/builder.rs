// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::hash::Hash;
use std::marker::PhantomData;
use std::time::Duration;

use crate::cache::MemoCache;
use crate::clock::Clock;
use crate::flight::FlightGroup;
use crate::store::EntryStore;

/// Builder for [`MemoCache`].
///
/// Created through [`MemoCache::builder`]. All settings have defaults; the
/// durations guard against configuration misuse by panicking on zero.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use memoflight::{Clock, MemoCache};
///
/// let cache = MemoCache::builder::<String, String>(Clock::new())
///     .name("org_contexts")
///     .ttl(Duration::from_secs(30))
///     .slow_fetch_warning(Duration::from_secs(5))
///     .build();
/// ```
#[derive(Debug)]
pub struct MemoCacheBuilder<K, V> {
    name: &'static str,
    clock: Clock,
    ttl: Duration,
    slow_fetch_warning: Duration,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> MemoCacheBuilder<K, V> {
    /// How long a stored value stays fresh unless overridden: 30 seconds.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

    /// Default fetch duration past which a warning is emitted: 5 seconds.
    /// Deliberately well above a healthy lookup's p99.
    pub const DEFAULT_SLOW_FETCH_WARNING: Duration = Duration::from_secs(5);

    pub(crate) fn new(clock: Clock) -> Self {
        Self {
            name: "memoflight",
            clock,
            ttl: Self::DEFAULT_TTL,
            slow_fetch_warning: Self::DEFAULT_SLOW_FETCH_WARNING,
            _marker: PhantomData,
        }
    }

    /// Sets the cache name carried on log events.
    #[must_use]
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Sets how long a stored value stays fresh.
    ///
    /// # Panics
    ///
    /// Panics if `ttl` is zero.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        assert!(!ttl.is_zero(), "ttl must be non-zero");
        self.ttl = ttl;
        self
    }

    /// Sets the fetch duration past which a warning event is emitted.
    ///
    /// The warning is diagnostics only; it never fails the lookup.
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is zero.
    #[must_use]
    pub fn slow_fetch_warning(mut self, threshold: Duration) -> Self {
        assert!(!threshold.is_zero(), "slow fetch warning threshold must be non-zero");
        self.slow_fetch_warning = threshold;
        self
    }

    /// Builds the cache.
    #[must_use]
    pub fn build(self) -> MemoCache<K, V>
    where
        K: Clone + Eq + Hash,
        V: Clone,
    {
        MemoCache::new(
            self.name,
            self.clock,
            EntryStore::new(self.ttl),
            FlightGroup::new(),
            self.slow_fetch_warning,
        )
    }
}
