//! # Shared Write Path
//!
//! `spec.md` §4.3's write-path algorithm and classification table,
//! implemented once and shared by `HybridCoordinator` and
//! `WriteAwareClient` (§4.4: "the same orchestration minus L1 reads").
//! The only difference between the two is which [`L1Hook`] they pass in.

use std::sync::Arc;
use std::time::Duration;

use hybridcache_common::{
    CacheResult, CacheValue, DistributedStore, InvalidationBus, InvalidationMessage, PublisherId,
};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::l1_hook::L1Hook;

pub(crate) struct WritePath<L1: L1Hook> {
    pub l2: Arc<dyn DistributedStore>,
    pub bus: Arc<dyn InvalidationBus>,
    pub publisher_id: PublisherId,
    pub topic: String,
    pub l1: L1,
}

impl<L1: L1Hook> WritePath<L1> {
    async fn publish(&self, msg: InvalidationMessage) {
        let payload = match bincode::serialize(&msg) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "failed to encode invalidation message, dropping publish");
                return;
            }
        };
        if let Err(err) = self.bus.publish(&self.topic, payload).await {
            warn!(error = %err, "invalidation bus publish failed, swallowing per spec");
        }
    }

    async fn publish_keys(&self, keys: Vec<String>, expires_at: Option<Duration>) {
        self.publish(InvalidationMessage::keys(self.publisher_id, keys, expires_at)).await;
    }

    async fn publish_flush(&self) {
        self.publish(InvalidationMessage::flush(self.publisher_id)).await;
    }

    pub async fn set(
        &self,
        key: &str,
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        only_if_absent: bool,
        only_if_present: bool,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        let outcome = cancellable(
            cancel,
            self.l2.set(key, value.clone(), ttl, only_if_absent, only_if_present),
        )
        .await?;
        if outcome.changed {
            match &value {
                CacheValue::Value(bytes) => self.l1.set_value(key, bytes, ttl),
                CacheValue::Null => self.l1.set_null(key, ttl),
                CacheValue::Absent => self.l1.evict(key),
            }
            self.publish_keys(vec![key.to_string()], ttl).await;
        } else {
            // Remove-on-failure: the conditional lost a race or the key
            // already had a conflicting state. Nothing changed at L2, so no
            // publish, but drop any stale L1 copy defensively.
            self.l1.evict(key);
        }
        Ok(outcome.changed)
    }

    pub async fn replace_if_equal(
        &self,
        key: &str,
        expected: &[u8],
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        let outcome = cancellable(
            cancel,
            self.l2.replace_if_equal(key, expected, value.clone(), ttl),
        )
        .await?;
        if outcome.changed {
            match &value {
                CacheValue::Value(bytes) => self.l1.set_value(key, bytes, ttl),
                CacheValue::Null => self.l1.set_null(key, ttl),
                CacheValue::Absent => self.l1.evict(key),
            }
            self.publish_keys(vec![key.to_string()], ttl).await;
        } else {
            self.l1.evict(key);
        }
        Ok(outcome.changed)
    }

    pub async fn remove(&self, key: &str, cancel: &CancellationToken) -> CacheResult<bool> {
        let outcome = cancellable(cancel, self.l2.remove(key)).await?;
        self.l1.evict(key);
        if outcome.removed {
            self.publish_keys(vec![key.to_string()], None).await;
        }
        Ok(outcome.removed)
    }

    pub async fn remove_if_equal(
        &self,
        key: &str,
        expected: &[u8],
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        let outcome = cancellable(cancel, self.l2.remove_if_equal(key, expected)).await?;
        self.l1.evict(key);
        if outcome.removed {
            self.publish_keys(vec![key.to_string()], None).await;
        }
        Ok(outcome.removed)
    }

    pub async fn remove_many(&self, keys: &[String], cancel: &CancellationToken) -> CacheResult<usize> {
        let outcome = cancellable(cancel, self.l2.remove_many(keys)).await?;
        for key in keys {
            self.l1.evict(key);
        }
        if outcome.removed_count > 0 {
            self.publish_keys(keys.to_vec(), None).await;
        }
        Ok(outcome.removed_count)
    }

    pub async fn remove_by_prefix(&self, prefix: &str, cancel: &CancellationToken) -> CacheResult<usize> {
        let outcome = cancellable(cancel, self.l2.remove_by_prefix(prefix)).await?;
        self.l1.evict_prefix(prefix);
        if outcome.removed_count > 0 {
            self.publish(InvalidationMessage::prefix(self.publisher_id, prefix.to_string())).await;
        }
        Ok(outcome.removed_count)
    }

    pub async fn remove_all(&self, keys: &[String], cancel: &CancellationToken) -> CacheResult<usize> {
        let outcome = cancellable(cancel, self.l2.remove_all(keys)).await?;
        if keys.is_empty() {
            self.l1.evict_all();
            if outcome.removed_count > 0 {
                self.publish_flush().await;
            }
        } else {
            for key in keys {
                self.l1.evict(key);
            }
            if outcome.removed_count > 0 {
                self.publish_keys(keys.to_vec(), None).await;
            }
        }
        Ok(outcome.removed_count)
    }

    pub async fn increment(
        &self,
        key: &str,
        delta: i64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<i64> {
        let outcome = cancellable(cancel, self.l2.increment(key, delta, ttl)).await?;
        self.l1.set_int(key, outcome.value, ttl);
        self.publish_keys(vec![key.to_string()], ttl).await;
        Ok(outcome.value)
    }

    pub async fn increment_f64(
        &self,
        key: &str,
        delta: f64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<f64> {
        let outcome = cancellable(cancel, self.l2.increment_f64(key, delta, ttl)).await?;
        self.l1.set_float(key, outcome.value, ttl);
        self.publish_keys(vec![key.to_string()], ttl).await;
        Ok(outcome.value)
    }

    pub async fn set_if_higher(
        &self,
        key: &str,
        value: i64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<i64> {
        let outcome = cancellable(cancel, self.l2.set_if_higher(key, value, ttl)).await?;
        if outcome.changed {
            self.l1.evict(key);
            self.publish_keys(vec![key.to_string()], ttl).await;
        }
        Ok(outcome.difference)
    }

    pub async fn set_if_lower(
        &self,
        key: &str,
        value: i64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<i64> {
        let outcome = cancellable(cancel, self.l2.set_if_lower(key, value, ttl)).await?;
        if outcome.changed {
            self.l1.evict(key);
            self.publish_keys(vec![key.to_string()], ttl).await;
        }
        Ok(outcome.difference)
    }

    pub async fn list_add(
        &self,
        key: &str,
        items: &[Vec<u8>],
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<usize> {
        let outcome = cancellable(cancel, self.l2.list_add(key, items, ttl)).await?;
        if outcome.count == items.len() {
            self.l1.list_add(key, items, ttl);
            self.publish_keys(vec![key.to_string()], ttl).await;
        } else if outcome.count > 0 {
            self.l1.evict(key);
            self.publish_keys(vec![key.to_string()], ttl).await;
        }
        Ok(outcome.count)
    }

    pub async fn list_remove(
        &self,
        key: &str,
        items: &[Vec<u8>],
        cancel: &CancellationToken,
    ) -> CacheResult<usize> {
        let outcome = cancellable(cancel, self.l2.list_remove(key, items)).await?;
        if outcome.count == items.len() {
            self.l1.list_remove(key, items);
            self.publish_keys(vec![key.to_string()], None).await;
        } else if outcome.count > 0 {
            self.l1.evict(key);
            self.publish_keys(vec![key.to_string()], None).await;
        }
        Ok(outcome.count)
    }

    pub async fn get_expiration(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> CacheResult<Option<Duration>> {
        cancellable(cancel, self.l2.get_expiration(key)).await
    }

    pub async fn set_expiration(
        &self,
        key: &str,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        let applied = cancellable(cancel, self.l2.set_expiration(key, ttl)).await?;
        if applied {
            self.l1.set_expiration(key, ttl);
        }
        Ok(applied)
    }
}

/// Races an L2 future against cancellation. Per `spec.md` §5: cancellation
/// before L2 returns must not touch L1 or publish; this is enforced simply
/// by never reaching those steps when this returns `Cancelled`.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl std::future::Future<Output = CacheResult<T>>,
) -> CacheResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(hybridcache_common::CacheError::Cancelled),
        result = fut => result,
    }
}
