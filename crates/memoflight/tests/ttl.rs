// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for TTL behavior and the slow-fetch diagnostics hook,
//! driven by a frozen clock.

use std::sync::atomic::{
    AtomicUsize,
    Ordering::{AcqRel, Acquire},
};
use std::time::Duration;

use futures::{StreamExt, stream::FuturesUnordered};
use memoflight::{Clock, MemoCache};
use tracing_test::traced_test;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
enum UpstreamError {
    #[error("upstream timed out")]
    Timeout,
}

const TTL: Duration = Duration::from_millis(1000);

#[tokio::test]
async fn value_is_fresh_below_the_ttl_and_stale_from_it() {
    let calls = AtomicUsize::default();
    let clock = Clock::new_frozen();
    let cache = MemoCache::builder::<String, i32>(clock.clone()).ttl(TTL).build();
    let key = "org".to_string();

    let first = cache
        .get_or_fetch(&key, || async {
            calls.fetch_add(1, AcqRel);
            Ok::<_, UpstreamError>(1)
        })
        .await
        .expect("fetch should succeed");
    assert_eq!(first, 1);

    // One tick short of the TTL: still served from the store.
    clock.advance(TTL - Duration::from_millis(1));
    let hit = cache
        .get_or_fetch(&key, || async {
            calls.fetch_add(1, AcqRel);
            Ok::<_, UpstreamError>(2)
        })
        .await
        .expect("hit should succeed");
    assert_eq!(hit, 1);
    assert_eq!(calls.load(Acquire), 1);

    // Exactly at the TTL the value is stale and a fresh fetch runs.
    clock.advance(Duration::from_millis(1));
    let refetched = cache
        .get_or_fetch(&key, || async {
            calls.fetch_add(1, AcqRel);
            Ok::<_, UpstreamError>(3)
        })
        .await
        .expect("refetch should succeed");
    assert_eq!(refetched, 3);
    assert_eq!(calls.load(Acquire), 2);
}

/// The concrete page-load timeline: twenty concurrent callers at t=0, a 600ms
/// fetch, a cache hit at t=700ms, and a refetch once the TTL has elapsed.
#[tokio::test(start_paused = true)]
async fn page_load_fanout_timeline() {
    let calls = AtomicUsize::default();
    let clock = Clock::new_frozen();
    let cache = MemoCache::builder::<String, String>(clock.clone()).ttl(TTL).build();
    let key = "org-1".to_string();

    let herd = FuturesUnordered::new();
    for _ in 0..20 {
        herd.push(cache.get_or_fetch(&key, || async {
            // The fetch takes 600ms; the frozen clock moves with it.
            tokio::time::sleep(Duration::from_millis(600)).await;
            clock.advance(Duration::from_millis(600));
            calls.fetch_add(1, AcqRel);
            Ok::<_, UpstreamError>("admin".to_string())
        }));
    }
    let results: Vec<_> = herd.collect().await;
    assert_eq!(calls.load(Acquire), 1);
    for result in results {
        assert_eq!(result.expect("coalesced fetch should succeed"), "admin");
    }

    // t=700ms: the value cached at t=600ms is fresh, no new fetch.
    clock.advance(Duration::from_millis(100));
    let hit = cache
        .get_or_fetch(&key, || async {
            calls.fetch_add(1, AcqRel);
            Ok::<_, UpstreamError>("other".to_string())
        })
        .await
        .expect("hit should succeed");
    assert_eq!(hit, "admin");
    assert_eq!(calls.load(Acquire), 1);

    // t=1600ms: the TTL has elapsed, a new fetch runs.
    clock.advance(Duration::from_millis(900));
    let refetched = cache
        .get_or_fetch(&key, || async {
            calls.fetch_add(1, AcqRel);
            Ok::<_, UpstreamError>("rotated".to_string())
        })
        .await
        .expect("refetch should succeed");
    assert_eq!(refetched, "rotated");
    assert_eq!(calls.load(Acquire), 2);
}

/// A caller arriving while a fetch is in flight coalesces onto it even when
/// the previously stored value expired in the meantime: in-flight wins.
#[tokio::test(start_paused = true)]
async fn mid_flight_caller_coalesces_despite_expiry() {
    let calls = AtomicUsize::default();
    let clock = Clock::new_frozen();
    let cache = MemoCache::builder::<String, String>(clock.clone()).ttl(TTL).build();
    let key = "org".to_string();

    cache
        .get_or_fetch(&key, || async {
            calls.fetch_add(1, AcqRel);
            Ok::<_, UpstreamError>("first".to_string())
        })
        .await
        .expect("priming fetch should succeed");

    // Let the entry expire, then start a slow refetch and race a second
    // caller against it.
    clock.advance(TTL * 2);
    let leader = cache.get_or_fetch(&key, || async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        calls.fetch_add(1, AcqRel);
        Ok::<_, UpstreamError>("second".to_string())
    });
    let mid_flight = cache.get_or_fetch(&key, || async {
        calls.fetch_add(1, AcqRel);
        Ok::<_, UpstreamError>("third".to_string())
    });

    let (led, coalesced) = tokio::join!(leader, mid_flight);

    assert_eq!(led.expect("leader should succeed"), "second");
    assert_eq!(coalesced.expect("mid-flight caller should share the result"), "second");
    assert_eq!(calls.load(Acquire), 2);
}

#[tokio::test]
#[traced_test]
async fn slow_fetch_emits_a_warning() {
    let clock = Clock::new_frozen();
    let cache = MemoCache::builder::<String, i32>(clock.clone())
        .slow_fetch_warning(Duration::from_millis(250))
        .build();
    let key = "org".to_string();

    cache
        .get_or_fetch(&key, || async {
            clock.advance(Duration::from_millis(300));
            Ok::<_, UpstreamError>(5)
        })
        .await
        .expect("a slow fetch still succeeds");

    assert!(logs_contain("fetch exceeded the slow-fetch warning threshold"));
}

#[tokio::test]
#[traced_test]
async fn fast_fetch_stays_quiet() {
    let clock = Clock::new_frozen();
    let cache = MemoCache::builder::<String, i32>(clock.clone())
        .slow_fetch_warning(Duration::from_millis(250))
        .build();
    let key = "org".to_string();

    cache
        .get_or_fetch(&key, || async {
            clock.advance(Duration::from_millis(10));
            Ok::<_, UpstreamError>(5)
        })
        .await
        .expect("fetch should succeed");

    assert!(!logs_contain("slow-fetch warning threshold"));
}
