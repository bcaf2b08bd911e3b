//! # HybridCoordinator
//!
//! The heart of the design (`spec.md` §4.3): orchestrates L1, L2, and the
//! invalidation bus per operation, with L2 as source of truth.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hybridcache_common::{
    validate_key, CacheResult, CacheValue, DistributedStore, InvalidationBus,
};
use hybridcache_memory::{MemoryStore, StoredValue};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::Cache;
use crate::config::CoordinatorConfig;
use crate::l1_hook::MemoryL1;
use crate::metrics::CoordinatorMetrics;
use crate::subscriber::{start_subscriber, SubscriberHandle};
use crate::write_path::{cancellable, WritePath};

/// A merged snapshot of the coordinator's own counters and its L1's
/// hit/miss/eviction/size counters, matching `spec.md` §6 in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub local_cache_hits: u64,
    pub invalidations_received: u64,
    pub invalidations_applied: u64,
    pub self_drops: u64,
    pub current_memory_size: usize,
    pub item_count: usize,
}

/// Two-tier coordinator: L1 `MemoryStore` + injected L2 + invalidation bus.
///
/// Owns its L1 and its subscriber task exclusively (`spec.md` §9
/// "Ownership"); L2 and the bus are shared, injected resources.
pub struct HybridCoordinator {
    l1: Arc<MemoryStore>,
    l2: Arc<dyn DistributedStore>,
    bus: Arc<dyn InvalidationBus>,
    publisher_id: hybridcache_common::PublisherId,
    topic: String,
    metrics: Arc<CoordinatorMetrics>,
    clone_values: bool,
    serializer: Option<Arc<dyn hybridcache_common::Serializer>>,
    subscriber: SubscriberHandle,
}

impl HybridCoordinator {
    /// Builds a coordinator, spawning its subscriber task against `bus`.
    pub async fn new(
        config: CoordinatorConfig,
        l2: Arc<dyn DistributedStore>,
        bus: Arc<dyn InvalidationBus>,
    ) -> CacheResult<Self> {
        let l1 = Arc::new(MemoryStore::with_config(config.memory));
        let metrics = Arc::new(CoordinatorMetrics::default());
        let subscriber = start_subscriber(
            Arc::clone(&l1),
            Arc::clone(&bus),
            config.topic.clone(),
            config.publisher_id,
            Arc::clone(&metrics),
        )
        .await?;

        Ok(HybridCoordinator {
            l1,
            l2,
            bus,
            publisher_id: config.publisher_id,
            topic: config.topic,
            metrics,
            clone_values: config.clone_values,
            serializer: config.serializer,
            subscriber,
        })
    }

    /// This instance's immutable publisher identity.
    pub fn publisher_id(&self) -> hybridcache_common::PublisherId {
        self.publisher_id
    }

    /// Merged L1 + coordinator counters.
    pub fn stats(&self) -> CoordinatorStats {
        let own = self.metrics.snapshot();
        let l1 = self.l1.stats();
        CoordinatorStats {
            hits: own.hits,
            misses: own.misses,
            evictions: l1.evictions,
            local_cache_hits: own.local_cache_hits,
            invalidations_received: own.invalidations_received,
            invalidations_applied: own.invalidations_applied,
            self_drops: own.self_drops,
            current_memory_size: self.l1.current_memory_size(),
            item_count: self.l1.item_count(),
        }
    }

    fn write_path(&self) -> WritePath<MemoryL1> {
        WritePath {
            l2: Arc::clone(&self.l2),
            bus: Arc::clone(&self.bus),
            publisher_id: self.publisher_id,
            topic: self.topic.clone(),
            l1: MemoryL1(Arc::clone(&self.l1)),
        }
    }

    /// Deep-copies a value through the injected serializer when
    /// `CloneValues` is enabled, isolating the caller's buffer from the
    /// copy entering L1/L2 (`spec.md` §9).
    fn isolate(&self, value: CacheValue<Vec<u8>>) -> CacheResult<CacheValue<Vec<u8>>> {
        if !self.clone_values {
            return Ok(value);
        }
        let serializer = self
            .serializer
            .as_ref()
            .expect("clone_values implies serializer is set");
        let bytes = serializer.serialize(&value)?;
        serializer.deserialize(&bytes)
    }

    fn stored_to_bytes(value: StoredValue) -> Vec<u8> {
        match value {
            StoredValue::Bytes(b) => b,
            StoredValue::Int(i) => i.to_le_bytes().to_vec(),
            StoredValue::Float(f) => f.to_le_bytes().to_vec(),
            StoredValue::List(items) => bincode::serialize(&items).unwrap_or_default(),
        }
    }
}

impl Drop for HybridCoordinator {
    fn drop(&mut self) {
        self.subscriber.stop();
    }
}

#[async_trait]
impl Cache for HybridCoordinator {
    async fn get(&self, key: &str, cancel: &CancellationToken) -> CacheResult<CacheValue<Vec<u8>>> {
        validate_key(key)?;
        match self.l1.get(key) {
            CacheValue::Value(v) => {
                self.metrics.record_local_hit();
                return Ok(CacheValue::Value(Self::stored_to_bytes(v)));
            }
            CacheValue::Null => {
                self.metrics.record_local_hit();
                return Ok(CacheValue::Null);
            }
            CacheValue::Absent => {}
        }
        self.metrics.record_miss();

        match cancellable(cancel, self.l2.get(key)).await? {
            CacheValue::Value(bytes) => {
                self.metrics.record_l2_hit();
                let ttl = self.l2.get_expiration(key).await.ok().flatten();
                debug!(key, "populating L1 from L2 after miss");
                self.l1.set(key, StoredValue::Bytes(bytes.clone()), ttl).ok();
                Ok(CacheValue::Value(bytes))
            }
            CacheValue::Null => {
                self.metrics.record_l2_hit();
                let ttl = self.l2.get_expiration(key).await.ok().flatten();
                self.l1.set_null(key, ttl).ok();
                Ok(CacheValue::Null)
            }
            CacheValue::Absent => Ok(CacheValue::Absent),
        }
    }

    async fn get_many(
        &self,
        keys: &[String],
        cancel: &CancellationToken,
    ) -> CacheResult<HashMap<String, CacheValue<Vec<u8>>>> {
        let mut result = HashMap::with_capacity(keys.len());
        let mut misses = Vec::new();
        for key in keys {
            match self.l1.get(key) {
                CacheValue::Absent => misses.push(key.clone()),
                hit => {
                    self.metrics.record_local_hit();
                    result.insert(key.clone(), hit.map(Self::stored_to_bytes));
                }
            }
        }
        if misses.is_empty() {
            return Ok(result);
        }
        for _ in &misses {
            self.metrics.record_miss();
        }
        let fetched = cancellable(cancel, self.l2.get_many(&misses)).await?;
        for key in misses {
            match fetched.get(&key).cloned().unwrap_or(CacheValue::Absent) {
                CacheValue::Value(bytes) => {
                    self.metrics.record_l2_hit();
                    self.l1.set(&key, StoredValue::Bytes(bytes.clone()), None).ok();
                    result.insert(key, CacheValue::Value(bytes));
                }
                CacheValue::Null => {
                    self.metrics.record_l2_hit();
                    self.l1.set_null(&key, None).ok();
                    result.insert(key, CacheValue::Null);
                }
                CacheValue::Absent => {
                    result.insert(key, CacheValue::Absent);
                }
            }
        }
        Ok(result)
    }

    async fn set(
        &self,
        key: &str,
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        validate_key(key)?;
        if matches!(ttl, Some(d) if d.is_zero()) {
            self.write_path().remove(key, cancel).await?;
            return Ok(false);
        }
        let value = self.isolate(value)?;
        self.write_path().set(key, value, ttl, false, false, cancel).await
    }

    async fn add(
        &self,
        key: &str,
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        validate_key(key)?;
        let value = self.isolate(value)?;
        self.write_path().set(key, value, ttl, true, false, cancel).await
    }

    async fn replace(
        &self,
        key: &str,
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        validate_key(key)?;
        let value = self.isolate(value)?;
        self.write_path().set(key, value, ttl, false, true, cancel).await
    }

    async fn replace_if_equal(
        &self,
        key: &str,
        expected: &[u8],
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        validate_key(key)?;
        let value = self.isolate(value)?;
        self.write_path().replace_if_equal(key, expected, value, ttl, cancel).await
    }

    async fn remove(&self, key: &str, cancel: &CancellationToken) -> CacheResult<bool> {
        validate_key(key)?;
        self.write_path().remove(key, cancel).await
    }

    async fn remove_if_equal(
        &self,
        key: &str,
        expected: &[u8],
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        validate_key(key)?;
        self.write_path().remove_if_equal(key, expected, cancel).await
    }

    async fn remove_many(&self, keys: &[String], cancel: &CancellationToken) -> CacheResult<usize> {
        self.write_path().remove_many(keys, cancel).await
    }

    async fn remove_by_prefix(&self, prefix: &str, cancel: &CancellationToken) -> CacheResult<usize> {
        self.write_path().remove_by_prefix(prefix, cancel).await
    }

    async fn remove_all(&self, keys: &[String], cancel: &CancellationToken) -> CacheResult<usize> {
        self.write_path().remove_all(keys, cancel).await
    }

    async fn increment(
        &self,
        key: &str,
        delta: i64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<i64> {
        validate_key(key)?;
        self.write_path().increment(key, delta, ttl, cancel).await
    }

    async fn increment_f64(
        &self,
        key: &str,
        delta: f64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<f64> {
        validate_key(key)?;
        self.write_path().increment_f64(key, delta, ttl, cancel).await
    }

    async fn set_if_higher(
        &self,
        key: &str,
        value: i64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<i64> {
        validate_key(key)?;
        self.write_path().set_if_higher(key, value, ttl, cancel).await
    }

    async fn set_if_lower(
        &self,
        key: &str,
        value: i64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<i64> {
        validate_key(key)?;
        self.write_path().set_if_lower(key, value, ttl, cancel).await
    }

    async fn list_add(
        &self,
        key: &str,
        items: &[Vec<u8>],
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<usize> {
        validate_key(key)?;
        self.write_path().list_add(key, items, ttl, cancel).await
    }

    async fn list_remove(
        &self,
        key: &str,
        items: &[Vec<u8>],
        cancel: &CancellationToken,
    ) -> CacheResult<usize> {
        validate_key(key)?;
        self.write_path().list_remove(key, items, cancel).await
    }

    async fn get_expiration(&self, key: &str, cancel: &CancellationToken) -> CacheResult<Option<Duration>> {
        validate_key(key)?;
        self.write_path().get_expiration(key, cancel).await
    }

    async fn set_expiration(
        &self,
        key: &str,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        validate_key(key)?;
        self.write_path().set_expiration(key, ttl, cancel).await
    }
}
