// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// The cache's source of "now".
///
/// Working with time is notoriously difficult to test: TTL behavior written
/// against `Instant::now()` directly can only be exercised by sleeping. The
/// clock makes the passage of time injectable - production code uses the
/// system clock, tests use a frozen clock and jump forward explicitly.
///
/// Cloning a clock is inexpensive (an `Arc` clone) and every clone shares the
/// same underlying state; advancing a frozen clock through one clone is
/// visible to every other clone created from it.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use memoflight::Clock;
///
/// let clock = Clock::new_frozen();
/// let before = clock.now();
///
/// clock.advance(Duration::from_secs(30));
///
/// assert_eq!(clock.now() - before, Duration::from_secs(30));
/// ```
#[derive(Clone, Debug)]
pub struct Clock(Arc<ClockState>);

#[derive(Debug)]
enum ClockState {
    System,
    Frozen { origin: Instant, offset: Mutex<Duration> },
}

impl Clock {
    /// Creates a clock backed by the system's monotonic time.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(ClockState::System))
    }

    /// Creates a frozen clock.
    ///
    /// Time does not pass on its own; it moves only through [`advance`][Self::advance].
    /// Intended for tests.
    #[must_use]
    pub fn new_frozen() -> Self {
        Self(Arc::new(ClockState::Frozen {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }))
    }

    /// Returns the current instant according to this clock.
    #[must_use]
    pub fn now(&self) -> Instant {
        match self.0.as_ref() {
            ClockState::System => Instant::now(),
            ClockState::Frozen { origin, offset } => *origin + *offset.lock(),
        }
    }

    /// Moves a frozen clock forward by `by`.
    ///
    /// # Panics
    ///
    /// Panics when called on a system clock; only frozen time can be steered.
    pub fn advance(&self, by: Duration) {
        match self.0.as_ref() {
            ClockState::System => panic!("Clock::advance requires a frozen clock"),
            ClockState::Frozen { offset, .. } => *offset.lock() += by,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
