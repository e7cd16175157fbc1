// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Twenty concurrent lookups for the same organization, one upstream fetch.
//!
//! Run with: `cargo run --example thundering_herd`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::{StreamExt, stream::FuturesUnordered};
use memoflight::{Clock, MemoCache};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let fetches = AtomicUsize::new(0);
    let cache = MemoCache::builder::<String, String>(Clock::new()).name("org_contexts").build();
    let key = "org-1".to_string();

    // A page load fans out many handlers that all need the same context.
    let herd = FuturesUnordered::new();
    for _ in 0..20 {
        herd.push(cache.get_or_fetch(&key, || async {
            // Stand-in for the identity-service round trip.
            tokio::time::sleep(Duration::from_millis(200)).await;
            fetches.fetch_add(1, Ordering::AcqRel);
            Ok::<_, std::io::Error>("role=admin".to_string())
        }));
    }
    let results: Vec<_> = herd.collect().await;

    println!(
        "{} callers answered by {} upstream fetch(es)",
        results.len(),
        fetches.load(Ordering::Acquire)
    );
}
