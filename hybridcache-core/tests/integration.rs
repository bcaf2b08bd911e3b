//! End-to-end scenarios against the bundled testkit fakes, mirroring the
//! in-process-collaborator approach of the teacher's
//! `hkv-client/tests/client.rs` rather than mocking deeper than necessary.

use std::sync::Arc;
use std::time::Duration;

use hybridcache_common::{CacheValue, DistributedStore, PublisherId};
use hybridcache_core::testkit::{InMemoryBus, InMemoryStore};
use hybridcache_core::{Cache, CoordinatorConfig, HybridCoordinator};
use tokio_util::sync::CancellationToken;

async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

fn cancel() -> CancellationToken {
    CancellationToken::new()
}

async fn build_pair() -> (HybridCoordinator, HybridCoordinator, Arc<InMemoryStore>, Arc<InMemoryBus>) {
    let l2 = Arc::new(InMemoryStore::new());
    let bus = Arc::new(InMemoryBus::new());
    let a = HybridCoordinator::new(
        CoordinatorConfig::new("domain").with_publisher_id(PublisherId::random()),
        l2.clone(),
        bus.clone(),
    )
    .await
    .unwrap();
    let b = HybridCoordinator::new(
        CoordinatorConfig::new("domain").with_publisher_id(PublisherId::random()),
        l2.clone(),
        bus.clone(),
    )
    .await
    .unwrap();
    (a, b, l2, bus)
}

#[tokio::test]
async fn shared_read_through() {
    let (a, b, _l2, _bus) = build_pair().await;
    let c = cancel();

    a.set("user:1", CacheValue::Value(b"alice".to_vec()), None, &c).await.unwrap();

    assert_eq!(a.stats().hits, 0);
    assert_eq!(a.stats().misses, 0);

    let value = b.get("user:1", &c).await.unwrap();
    assert_eq!(value, CacheValue::Value(b"alice".to_vec()));
    assert_eq!(b.stats().misses, 1);
    assert_eq!(b.stats().local_cache_hits, 0);

    let value = b.get("user:1", &c).await.unwrap();
    assert_eq!(value, CacheValue::Value(b"alice".to_vec()));
    assert_eq!(b.stats().local_cache_hits, 1);
}

#[tokio::test]
async fn invalidation_on_update() {
    let (a, b, _l2, _bus) = build_pair().await;
    let c = cancel();

    a.set("user:1", CacheValue::Value(b"alice".to_vec()), None, &c).await.unwrap();
    b.get("user:1", &c).await.unwrap();

    a.set("user:1", CacheValue::Value(b"alice2".to_vec()), None, &c).await.unwrap();
    settle().await;

    let before = b.stats().misses;
    let value = b.get("user:1", &c).await.unwrap();
    assert_eq!(value, CacheValue::Value(b"alice2".to_vec()));
    assert_eq!(b.stats().misses, before + 1, "B's L1 must have been evicted by the invalidation");
}

#[tokio::test]
async fn smart_no_publish_on_missing_remove() {
    let (a, b, _l2, _bus) = build_pair().await;
    let c = cancel();

    let removed = a.remove("missing", &c).await.unwrap();
    assert!(!removed);
    settle().await;

    assert_eq!(b.stats().invalidations_received, 0);
}

#[tokio::test]
async fn partial_list_add_evicts_and_republishes() {
    let (a, b, l2, _bus) = build_pair().await;
    let c = cancel();

    l2.list_add("k", &[b"x".to_vec()], None).await.unwrap();
    b.get("k", &c).await.unwrap();

    let added = a.list_add("k", &[b"x".to_vec(), b"y".to_vec()], None, &c).await.unwrap();
    assert_eq!(added, 1);
    settle().await;

    let before = b.stats().misses;
    b.get("k", &c).await.unwrap();
    assert_eq!(b.stats().misses, before + 1);
}

#[tokio::test]
async fn lru_bound_respected_through_coordinator() {
    let c = cancel();
    let l2 = Arc::new(InMemoryStore::new());
    let bus = Arc::new(InMemoryBus::new());
    let bounded = HybridCoordinator::new(
        CoordinatorConfig::new("domain")
            .with_memory(hybridcache_memory::MemoryStoreConfig { max_items: Some(10), ..Default::default() }),
        l2,
        bus,
    )
    .await
    .unwrap();

    for i in 0..10 {
        bounded.set(&format!("k{i}"), CacheValue::Value(vec![]), None, &c).await.unwrap();
    }
    bounded.set("k10", CacheValue::Value(vec![]), None, &c).await.unwrap();

    assert_eq!(bounded.stats().item_count, 10);

    // L1 no longer holds "k0" (evicted), so reading it is an L1 miss that
    // falls through to (and repopulates from) L2 — a coordinator `get`
    // self-heals, unlike a bare `MemoryStore::get`. The eviction is
    // observable as a miss, not as an absent value.
    let misses_before = bounded.stats().misses;
    assert!(bounded.get("k0", &c).await.unwrap().is_present());
    assert_eq!(bounded.stats().misses, misses_before + 1);

    // "k10" is still the most-recently-written entry and was never
    // evicted, so reading it is a pure local hit.
    let misses_before = bounded.stats().misses;
    assert!(bounded.get("k10", &c).await.unwrap().is_present());
    assert_eq!(bounded.stats().misses, misses_before);
}

#[tokio::test]
async fn flush_all_clears_peer_l1() {
    let (a, b, _l2, _bus) = build_pair().await;
    let c = cancel();

    a.set("k1", CacheValue::Value(b"v1".to_vec()), None, &c).await.unwrap();
    a.set("k2", CacheValue::Value(b"v2".to_vec()), None, &c).await.unwrap();
    b.get("k1", &c).await.unwrap();
    b.get("k2", &c).await.unwrap();

    a.remove_all(&[], &c).await.unwrap();
    settle().await;

    assert_eq!(b.stats().item_count, 0);
}

#[tokio::test]
async fn self_originated_invalidations_are_dropped() {
    let (a, _b, _l2, _bus) = build_pair().await;
    let c = cancel();

    a.set("k", CacheValue::Value(b"v".to_vec()), None, &c).await.unwrap();
    a.remove("k", &c).await.unwrap();
    settle().await;

    assert_eq!(a.stats().self_drops, 2, "A must drop both invalidations it published itself");
    assert_eq!(a.stats().invalidations_applied, 0);
}

#[tokio::test]
async fn null_is_distinct_from_absent_through_coordinator() {
    let (a, b, _l2, _bus) = build_pair().await;
    let c = cancel();

    a.set("k", CacheValue::Null, None, &c).await.unwrap();
    settle().await;

    assert_eq!(b.get("k", &c).await.unwrap(), CacheValue::Null);
    assert_eq!(b.get("missing", &c).await.unwrap(), CacheValue::Absent);
}

#[tokio::test]
async fn bus_publish_failure_is_swallowed() {
    let l2 = Arc::new(InMemoryStore::new());
    let bus = Arc::new(hybridcache_core::testkit::FailingBus);
    let coordinator = HybridCoordinator::new(CoordinatorConfig::new("domain"), l2, bus).await.unwrap();
    let c = cancel();

    let result = coordinator.set("k", CacheValue::Value(b"v".to_vec()), None, &c).await;
    assert!(result.is_ok(), "bus failures must not surface to the caller");
    assert_eq!(coordinator.get("k", &c).await.unwrap(), CacheValue::Value(b"v".to_vec()));
}
