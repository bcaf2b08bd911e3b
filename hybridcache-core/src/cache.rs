//! # Cache Contract
//!
//! The common surface implemented by [`crate::HybridCoordinator`],
//! [`crate::WriteAwareClient`], and [`crate::ScopedView`] (over any of the
//! above), so `ScopedView` can wrap any of them uniformly per `spec.md`
//! §4.5.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use hybridcache_common::{CacheResult, CacheValue};
use tokio_util::sync::CancellationToken;

/// The full cache contract of `spec.md` §4.1/§4.3, expressed over opaque
/// byte payloads. Every method accepts a cancellation token per §5.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str, cancel: &CancellationToken) -> CacheResult<CacheValue<Vec<u8>>>;

    async fn get_many(
        &self,
        keys: &[String],
        cancel: &CancellationToken,
    ) -> CacheResult<HashMap<String, CacheValue<Vec<u8>>>>;

    async fn set(
        &self,
        key: &str,
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool>;

    async fn add(
        &self,
        key: &str,
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool>;

    async fn replace(
        &self,
        key: &str,
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool>;

    async fn replace_if_equal(
        &self,
        key: &str,
        expected: &[u8],
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool>;

    async fn remove(&self, key: &str, cancel: &CancellationToken) -> CacheResult<bool>;

    async fn remove_if_equal(
        &self,
        key: &str,
        expected: &[u8],
        cancel: &CancellationToken,
    ) -> CacheResult<bool>;

    async fn remove_many(&self, keys: &[String], cancel: &CancellationToken) -> CacheResult<usize>;

    async fn remove_by_prefix(&self, prefix: &str, cancel: &CancellationToken) -> CacheResult<usize>;

    async fn remove_all(&self, keys: &[String], cancel: &CancellationToken) -> CacheResult<usize>;

    async fn increment(
        &self,
        key: &str,
        delta: i64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<i64>;

    async fn increment_f64(
        &self,
        key: &str,
        delta: f64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<f64>;

    async fn set_if_higher(
        &self,
        key: &str,
        value: i64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<i64>;

    async fn set_if_lower(
        &self,
        key: &str,
        value: i64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<i64>;

    async fn list_add(
        &self,
        key: &str,
        items: &[Vec<u8>],
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<usize>;

    async fn list_remove(
        &self,
        key: &str,
        items: &[Vec<u8>],
        cancel: &CancellationToken,
    ) -> CacheResult<usize>;

    async fn get_expiration(&self, key: &str, cancel: &CancellationToken) -> CacheResult<Option<Duration>>;

    async fn set_expiration(
        &self,
        key: &str,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool>;
}
