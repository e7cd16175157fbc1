// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Time-bounded, single-flight memoizing cache for expensive lookups.
//!
//! This crate provides [`MemoCache`], a cache that coalesces concurrent
//! lookups for the same key onto a single in-flight fetch while memoizing
//! successful results for a configurable time-to-live. It exists for the
//! "page load fans out twenty identical lookups" situation: naively, every
//! handler sees the same cold cache and issues its own upstream request,
//! saturating the upstream connection pool - the classic thundering herd.
//!
//! # When to Use
//!
//! Use `MemoCache` in front of an expensive or rate-limited lookup that many
//! concurrent callers may request with the same key:
//!
//! - **Authorization context resolution**: one identity-service round trip
//!   per tenant, no matter how many request handlers ask at once
//! - **Configuration lookups**: deduplicate reads of slowly-changing rows
//! - **Remote metadata**: coalesce identical API calls issued simultaneously
//!
//! # Example
//!
//! ```
//! use memoflight::{Clock, MemoCache};
//!
//! # futures::executor::block_on(async {
//! let cache = MemoCache::builder::<String, String>(Clock::new()).build();
//!
//! // Concurrent calls with the same key share a single fetch execution.
//! let value = cache
//!     .get_or_fetch(&"org-1".to_string(), || async {
//!         Ok::<_, std::io::Error>("admin".to_string())
//!     })
//!     .await?;
//!
//! assert_eq!(value, "admin");
//! # Ok::<(), memoflight::FetchError>(())
//! # });
//! ```
//!
//! # Time-to-live
//!
//! A stored value is fresh while `now - cached_at < ttl` and a miss from that
//! point on; expiry is evaluated lazily at read time and absent-vs-expired is
//! not distinguishable to callers. Fetch failures are never stored: the error
//! is shared with every coalesced waiter and the key stays cold, so the next
//! caller retries. A caller that arrives while a fetch is in flight always
//! joins that fetch, even when the previously stored value has expired in the
//! meantime.
//!
//! # Cancellation and Panic Safety
//!
//! - A waiter that is cancelled detaches without affecting the in-flight
//!   fetch or the other waiters.
//! - If the fetching caller is cancelled or panics, the next waiter in line
//!   takes over and runs its own fetch; no key can get stuck "fetching".
//!
//! # Thread Safety
//!
//! [`MemoCache`] is `Send` and `Sync` and is designed to be constructed once
//! and shared (for example behind an `Arc`) by whatever layer needs it.
//! Operations on distinct keys never block each other; a slow fetch for one
//! key cannot delay any other key.

#![doc(html_logo_url = "https://media.githubusercontent.com/media/microsoft/oxidizer/refs/heads/main/crates/memoflight/logo.png")]
#![doc(html_favicon_url = "https://media.githubusercontent.com/media/microsoft/oxidizer/refs/heads/main/crates/memoflight/favicon.ico")]

mod builder;
mod cache;
mod clock;
mod error;
mod flight;
mod store;

pub use builder::MemoCacheBuilder;
pub use cache::MemoCache;
pub use clock::Clock;
pub use error::{FetchError, Result};
