// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The public cache type: TTL-bounded memoization with single-flight fetches.

use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use crate::builder::MemoCacheBuilder;
use crate::clock::Clock;
use crate::error::FetchError;
use crate::flight::FlightGroup;
use crate::store::EntryStore;

/// A time-bounded, single-flight memoizing cache.
///
/// `MemoCache` sits in front of an expensive lookup and guarantees that at
/// most one execution of the fetch function is in flight per key at a time.
/// Callers that find a fresh stored value return immediately; callers that
/// find a fetch in flight await it and share its outcome; everyone else
/// starts the fetch themselves.
///
/// The cache is an explicitly constructed, explicitly owned instance - inject
/// it into whatever layer needs the lookups rather than reaching for a
/// process-wide singleton; lifecycle and test isolation stay clean that way.
///
/// # Examples
///
/// ```
/// use memoflight::{Clock, MemoCache};
///
/// # futures::executor::block_on(async {
/// let cache = MemoCache::builder::<String, String>(Clock::new()).build();
///
/// let value = cache
///     .get_or_fetch(&"org-1".to_string(), || async {
///         Ok::<_, std::io::Error>("admin".to_string())
///     })
///     .await?;
/// assert_eq!(value, "admin");
///
/// // The second call is served from the store; its fetch never runs.
/// let value = cache
///     .get_or_fetch(&"org-1".to_string(), || async {
///         Ok::<_, std::io::Error>("refetched".to_string())
///     })
///     .await?;
/// assert_eq!(value, "admin");
/// # Ok::<(), memoflight::FetchError>(())
/// # });
/// ```
pub struct MemoCache<K, V> {
    name: &'static str,
    clock: Clock,
    store: EntryStore<K, V>,
    flights: FlightGroup<K, Result<V, FetchError>>,
    slow_fetch_warning: Duration,
}

impl MemoCache<(), ()> {
    /// Creates a new cache builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use memoflight::{Clock, MemoCache};
    ///
    /// let cache = MemoCache::builder::<String, i32>(Clock::new())
    ///     .ttl(Duration::from_secs(30))
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder<K, V>(clock: Clock) -> MemoCacheBuilder<K, V> {
        MemoCacheBuilder::new(clock)
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub(crate) fn new(
        name: &'static str,
        clock: Clock,
        store: EntryStore<K, V>,
        flights: FlightGroup<K, Result<V, FetchError>>,
        slow_fetch_warning: Duration,
    ) -> Self {
        Self {
            name,
            clock,
            store,
            flights,
            slow_fetch_warning,
        }
    }

    /// Returns the stored value for `key`, fetching it if missing or expired.
    ///
    /// `fetch` is only invoked when no fresh value exists and no fetch for
    /// `key` is already in flight; callers that race on a cold key coalesce
    /// onto a single execution and all receive its result - on failure, every
    /// coalesced caller receives a clone of the same [`FetchError`] and
    /// nothing is stored, so the next caller after the flight settles retries.
    ///
    /// `fetch` owns its own deadline: the cache imposes no timeout. A fetch
    /// that outlives the configured slow-fetch warning threshold is reported
    /// through a `tracing` warning but is otherwise unaffected.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `fetch` (this caller's own, or the one
    /// it was coalesced onto). The cache adds no failure modes of its own.
    pub async fn get_or_fetch<E, F, Fut>(&self, key: &K, fetch: F) -> Result<V, FetchError>
    where
        E: std::error::Error + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.store.get(key, self.clock.now()) {
            tracing::debug!(cache = self.name, "hit");
            return Ok(value);
        }

        self.flights.join(key.clone(), || self.lead(key, fetch)).await
    }

    /// Runs on the caller that ends up leading the key's flight.
    async fn lead<E, F, Fut>(&self, key: &K, fetch: F) -> Result<V, FetchError>
    where
        E: std::error::Error + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        // Another flight may have landed between this caller's miss and its
        // winning the flight; what it stored is current, don't fetch again.
        if let Some(value) = self.store.get(key, self.clock.now()) {
            tracing::debug!(cache = self.name, "hit after coalescing");
            return Ok(value);
        }

        let started = self.clock.now();
        let outcome = fetch().await;
        let elapsed = self.clock.now().saturating_duration_since(started);
        if elapsed >= self.slow_fetch_warning {
            tracing::warn!(
                cache = self.name,
                elapsed = ?elapsed,
                threshold = ?self.slow_fetch_warning,
                "fetch exceeded the slow-fetch warning threshold"
            );
        }

        match outcome {
            Ok(value) => {
                self.store.insert(key.clone(), value.clone(), self.clock.now());
                tracing::debug!(cache = self.name, "miss, fetched and stored");
                Ok(value)
            }
            Err(cause) => {
                // A failed fetch must not poison the store; the key stays
                // cold and the failure is surfaced to every waiter.
                tracing::debug!(cache = self.name, error = %cause, "fetch failed, nothing stored");
                Err(FetchError::caused_by(cause))
            }
        }
    }

    /// Removes the stored value for `key`, if any.
    ///
    /// For use when upstream state is known to have changed - credential
    /// rotation, logout. A fetch already in flight is unaffected; its landing
    /// write may reinstate the entry within the TTL-order consistency window.
    pub fn invalidate(&self, key: &K) {
        self.store.invalidate(key);
        tracing::debug!(cache = self.name, "invalidated");
    }

    /// Returns `true` if a fresh value for `key` is currently stored.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.store.get(key, self.clock.now()).is_some()
    }

    /// Removes all stored values.
    pub fn clear(&self) {
        self.store.clear();
        tracing::debug!(cache = self.name, "cleared");
    }

    /// Number of stored entries, counting expired ones not yet overwritten
    /// or invalidated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cache name carried on log events.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns how long stored values stay fresh.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.store.ttl()
    }

    /// Returns a reference to the cache's clock.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}

impl<K, V> fmt::Debug for MemoCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("name", &self.name)
            .field("store", &self.store)
            .field("flights", &self.flights)
            .field("slow_fetch_warning", &self.slow_fetch_warning)
            .finish_non_exhaustive()
    }
}
