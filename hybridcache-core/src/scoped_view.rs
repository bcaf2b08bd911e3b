//! # ScopedView
//!
//! `spec.md` §4.5: a key-prefix wrapper applied uniformly over any cache
//! implementation. Scopes compose: `ScopedView(ScopedView(C,"a"),"b")` is
//! identical to `ScopedView(C,"a:b")`, because the inner scope is folded
//! into one prefix string rather than nesting wrapper calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hybridcache_common::{CacheResult, CacheValue};
use tokio_util::sync::CancellationToken;

use crate::cache::Cache;

/// Prepends `scope + ":"` to every key on entry and strips it on listings.
pub struct ScopedView<C: Cache> {
    inner: Arc<C>,
    prefix: String,
}

impl<C: Cache> ScopedView<C> {
    /// Wraps `inner` in the scope `scope`.
    pub fn new(inner: Arc<C>, scope: impl Into<String>) -> Self {
        ScopedView {
            inner,
            prefix: format!("{}:", scope.into()),
        }
    }

    /// Composes a further scope onto this view. Folds into a single prefix
    /// string, satisfying `ScopedView(ScopedView(C,"a"),"b") ==
    /// ScopedView(C,"a:b")` without nesting wrapper types.
    pub fn scope(self, scope: impl Into<String>) -> ScopedView<C> {
        ScopedView {
            inner: self.inner,
            prefix: format!("{}{}:", self.prefix, scope.into()),
        }
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    fn strip<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(self.prefix.as_str()).unwrap_or(key)
    }
}

#[async_trait]
impl<C: Cache> Cache for ScopedView<C> {
    async fn get(&self, key: &str, cancel: &CancellationToken) -> CacheResult<CacheValue<Vec<u8>>> {
        self.inner.get(&self.scoped(key), cancel).await
    }

    async fn get_many(
        &self,
        keys: &[String],
        cancel: &CancellationToken,
    ) -> CacheResult<HashMap<String, CacheValue<Vec<u8>>>> {
        let scoped_keys: Vec<String> = keys.iter().map(|k| self.scoped(k)).collect();
        let result = self.inner.get_many(&scoped_keys, cancel).await?;
        Ok(result
            .into_iter()
            .map(|(k, v)| (self.strip(&k).to_string(), v))
            .collect())
    }

    async fn set(
        &self,
        key: &str,
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        self.inner.set(&self.scoped(key), value, ttl, cancel).await
    }

    async fn add(
        &self,
        key: &str,
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        self.inner.add(&self.scoped(key), value, ttl, cancel).await
    }

    async fn replace(
        &self,
        key: &str,
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        self.inner.replace(&self.scoped(key), value, ttl, cancel).await
    }

    async fn replace_if_equal(
        &self,
        key: &str,
        expected: &[u8],
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        self.inner.replace_if_equal(&self.scoped(key), expected, value, ttl, cancel).await
    }

    async fn remove(&self, key: &str, cancel: &CancellationToken) -> CacheResult<bool> {
        self.inner.remove(&self.scoped(key), cancel).await
    }

    async fn remove_if_equal(
        &self,
        key: &str,
        expected: &[u8],
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        self.inner.remove_if_equal(&self.scoped(key), expected, cancel).await
    }

    async fn remove_many(&self, keys: &[String], cancel: &CancellationToken) -> CacheResult<usize> {
        let scoped_keys: Vec<String> = keys.iter().map(|k| self.scoped(k)).collect();
        self.inner.remove_many(&scoped_keys, cancel).await
    }

    async fn remove_by_prefix(&self, prefix: &str, cancel: &CancellationToken) -> CacheResult<usize> {
        self.inner.remove_by_prefix(&self.scoped(prefix), cancel).await
    }

    /// `removeAll()` with no keys would flush the *entire* underlying
    /// cache, breaking scope isolation (`spec.md` §4.5: "the scope itself
    /// is invisible outside"). Within a scope this is remapped to
    /// `removeByPrefix(scope)` instead, and `removeAll(keys)` scopes each
    /// key as usual.
    async fn remove_all(&self, keys: &[String], cancel: &CancellationToken) -> CacheResult<usize> {
        if keys.is_empty() {
            self.inner.remove_by_prefix(&self.prefix, cancel).await
        } else {
            let scoped_keys: Vec<String> = keys.iter().map(|k| self.scoped(k)).collect();
            self.inner.remove_all(&scoped_keys, cancel).await
        }
    }

    async fn increment(
        &self,
        key: &str,
        delta: i64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<i64> {
        self.inner.increment(&self.scoped(key), delta, ttl, cancel).await
    }

    async fn increment_f64(
        &self,
        key: &str,
        delta: f64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<f64> {
        self.inner.increment_f64(&self.scoped(key), delta, ttl, cancel).await
    }

    async fn set_if_higher(
        &self,
        key: &str,
        value: i64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<i64> {
        self.inner.set_if_higher(&self.scoped(key), value, ttl, cancel).await
    }

    async fn set_if_lower(
        &self,
        key: &str,
        value: i64,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<i64> {
        self.inner.set_if_lower(&self.scoped(key), value, ttl, cancel).await
    }

    async fn list_add(
        &self,
        key: &str,
        items: &[Vec<u8>],
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<usize> {
        self.inner.list_add(&self.scoped(key), items, ttl, cancel).await
    }

    async fn list_remove(
        &self,
        key: &str,
        items: &[Vec<u8>],
        cancel: &CancellationToken,
    ) -> CacheResult<usize> {
        self.inner.list_remove(&self.scoped(key), items, cancel).await
    }

    async fn get_expiration(&self, key: &str, cancel: &CancellationToken) -> CacheResult<Option<Duration>> {
        self.inner.get_expiration(&self.scoped(key), cancel).await
    }

    async fn set_expiration(
        &self,
        key: &str,
        ttl: Option<Duration>,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        self.inner.set_expiration(&self.scoped(key), ttl, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{InMemoryBus, InMemoryStore};
    use crate::{CoordinatorConfig, HybridCoordinator};
    use hybridcache_common::PublisherId;

    async fn build_coordinator() -> HybridCoordinator {
        let l2 = Arc::new(InMemoryStore::new());
        let bus = Arc::new(InMemoryBus::new());
        let config = CoordinatorConfig::new("test-topic").with_publisher_id(PublisherId::random());
        HybridCoordinator::new(config, l2, bus).await.unwrap()
    }

    #[tokio::test]
    async fn composition_law_matches_single_scope() {
        let cache = Arc::new(build_coordinator().await);
        let cancel = CancellationToken::new();

        let nested = ScopedView::new(Arc::clone(&cache), "a").scope("b");
        nested
            .set("k", CacheValue::Value(b"v".to_vec()), None, &cancel)
            .await
            .unwrap();

        let flat = ScopedView::new(Arc::clone(&cache), "a:b");
        assert_eq!(
            flat.get("k", &cancel).await.unwrap(),
            CacheValue::Value(b"v".to_vec())
        );
        assert_eq!(
            cache.get("a:b:k", &cancel).await.unwrap(),
            CacheValue::Value(b"v".to_vec())
        );
    }

    #[tokio::test]
    async fn scoped_set_is_observable_on_unscoped_key() {
        let cache = Arc::new(build_coordinator().await);
        let cancel = CancellationToken::new();
        let view = ScopedView::new(Arc::clone(&cache), "users");

        view.set("1", CacheValue::Value(b"alice".to_vec()), None, &cancel)
            .await
            .unwrap();

        assert_eq!(
            cache.get("users:1", &cancel).await.unwrap(),
            CacheValue::Value(b"alice".to_vec())
        );
    }
}
