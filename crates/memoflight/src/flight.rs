// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-key coalescing of concurrent fetches.
//!
//! The registry maps each key to its current in-flight fetch, if any. The
//! map holds only [`Weak`] references; waiters hold the [`Arc`]s, so a flight
//! that loses every waiter (all of them cancelled) dies with them and the
//! stale registry entry is replaced on the next access. No flight can outlive
//! its waiters and no key can get stuck "fetching".

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Weak};

use parking_lot::Mutex as SyncMutex;
use tokio::sync::Mutex as AsyncMutex;

/// One generation of in-flight work for a key.
///
/// The slot is empty while the fetch runs and holds the shared outcome once
/// it settles. The first waiter to acquire the slot lock while it is empty is
/// the leader; the lock is held for the duration of the fetch, so every other
/// waiter blocks on it and then clones the published outcome.
struct Flight<T> {
    slot: AsyncMutex<Option<T>>,
}

/// Registry of in-flight fetches, one at most per key.
pub(crate) struct FlightGroup<K, T> {
    flights: SyncMutex<HashMap<K, Weak<Flight<T>>>>,
}

impl<K, T> FlightGroup<K, T>
where
    K: Clone + Eq + Hash,
    T: Clone,
{
    pub(crate) fn new() -> Self {
        Self {
            flights: SyncMutex::new(HashMap::new()),
        }
    }

    /// Joins the key's in-flight fetch, starting one if none exists.
    ///
    /// The check-and-register is a single atomic step under the registry
    /// lock: of two callers racing on a cold key, exactly one creates the
    /// flight and the other attaches to it. The lock covers only the map
    /// operation - never the fetch itself - so slow work on one key cannot
    /// delay any other key.
    ///
    /// `func` runs if this caller ends up leading the flight: either it
    /// created the flight, or every caller ahead of it was cancelled before
    /// publishing an outcome and leadership fell through to it.
    pub(crate) async fn join<F, Fut>(&self, key: K, func: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let flight = {
            let mut flights = self.flights.lock();
            if let Some(flight) = flights.get(&key).and_then(Weak::upgrade) {
                flight
            } else {
                let flight = Arc::new(Flight {
                    slot: AsyncMutex::new(None),
                });
                flights.insert(key.clone(), Arc::downgrade(&flight));
                flight
            }
        };

        let mut slot = flight.slot.lock().await;
        if let Some(outcome) = slot.as_ref() {
            return outcome.clone();
        }

        // Empty slot and we hold its lock: we lead this flight. The registry
        // entry is removed before the outcome is published, so no observer
        // can find a settled fetch still registered as in-flight.
        let outcome = func().await;
        self.flights.lock().remove(&key);
        *slot = Some(outcome.clone());
        outcome
    }

    /// Number of registered flights whose waiters are still alive.
    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        self.flights.lock().values().filter(|flight| flight.strong_count() > 0).count()
    }
}

impl<K, T> fmt::Debug for FlightGroup<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightGroup").finish_non_exhaustive()
    }
}
