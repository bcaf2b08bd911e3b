//! # WriteAwareClient
//!
//! `spec.md` §4.4: the same write contract as `HybridCoordinator`, but with
//! no L1 — reads pass straight through to L2, writes publish invalidations
//! identically so that real coordinators refresh their L1. Used by
//! write-heavy participants that produce but never re-read.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hybridcache_common::{validate_key, CacheResult, CacheValue, DistributedStore, InvalidationBus, PublisherId};
use tokio_util::sync::CancellationToken;

use crate::cache::Cache;
use crate::l1_hook::NoopL1;
use crate::write_path::{cancellable, WritePath};

/// Write-path-only client: shares `WritePath` with `HybridCoordinator`
/// through `NoopL1`, so no L1 policy ever actually runs.
pub struct WriteAwareClient {
    l2: Arc<dyn DistributedStore>,
    bus: Arc<dyn InvalidationBus>,
    publisher_id: PublisherId,
    topic: String,
}

impl WriteAwareClient {
    pub fn new(
        l2: Arc<dyn DistributedStore>,
        bus: Arc<dyn InvalidationBus>,
        topic: impl Into<String>,
        publisher_id: PublisherId,
    ) -> Self {
        WriteAwareClient {
            l2,
            bus,
            publisher_id,
            topic: topic.into(),
        }
    }

    fn write_path(&self) -> WritePath<NoopL1> {
        WritePath {
            l2: Arc::clone(&self.l2),
            bus: Arc::clone(&self.bus),
            publisher_id: self.publisher_id,
            topic: self.topic.clone(),
            l1: NoopL1,
        }
    }
}

#[async_trait]
impl Cache for WriteAwareClient {
    async fn get(&self, key: &str, cancel: &CancellationToken) -> CacheResult<CacheValue<Vec<u8>>> {
        validate_key(key)?;
        cancellable(cancel, self.l2.get(key)).await
    }

    async fn get_many(
        &self,
        keys: &[String],
        _cancel: &CancellationToken,
    ) -> CacheResult<HashMap<String, CacheValue<Vec<u8>>>> {
        self.l2.get_many(keys).await
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
