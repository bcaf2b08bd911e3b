//! # External Collaborator Interfaces
//!
//! `spec.md` §6 treats the distributed store, the invalidation transport,
//! the serializer, and the clock as external collaborators. This module
//! defines their contracts as capability traits so the coordinator never
//! depends on a concrete implementation (dynamic dispatch over concrete
//! stores, per `spec.md` §9).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheResult;
use crate::value::CacheValue;

/// Outcome of a set/replace-style L2 write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Whether L2's state actually changed as a result of this call.
    pub changed: bool,
}

impl WriteOutcome {
    /// Convenience constructor for a write that changed L2 state.
    pub fn changed() -> Self {
        WriteOutcome { changed: true }
    }

    /// Convenience constructor for a write that did not change L2 state
    /// (e.g. `onlyIfAbsent` lost a race, or the conditional check failed).
    pub fn unchanged() -> Self {
        WriteOutcome { changed: false }
    }
}

/// Outcome of a single-key remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// Whether a key was actually removed.
    pub removed: bool,
}

/// Outcome of a multi-key or prefix remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkRemoveOutcome {
    /// Number of keys removed.
    pub removed_count: usize,
}

/// Outcome of an integer increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementOutcome {
    /// The new value after applying the delta.
    pub value: i64,
}

/// Outcome of a floating-point increment (kept as a distinct entry point so
/// exact IEEE-754 semantics are never blurred with the integer path).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncrementFloatOutcome {
    /// The new value after applying the delta.
    pub value: f64,
}

/// Outcome of `setIfHigher`/`setIfLower`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdOutcome {
    /// Whether the stored value was replaced.
    pub changed: bool,
    /// `new - old` when changed, `0` otherwise.
    pub difference: i64,
}

/// Outcome of `listAdd`/`listRemove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOutcome {
    /// Number of items actually added or removed.
    pub count: usize,
}

/// The distributed, shared cache tier. Source of truth for every value
/// observable through the hybrid coordinator.
///
/// Implementations are injected; this crate never assumes a concrete
/// backend (Redis, Memcached, a SQL table, ...).
#[async_trait]
pub trait DistributedStore: Send + Sync {
    /// Reads a single key.
    async fn get(&self, key: &str) -> CacheResult<CacheValue<Vec<u8>>>;

    /// Reads multiple keys in one round trip. Not a snapshot: each key is
    /// resolved independently.
    async fn get_many(&self, keys: &[String]) -> CacheResult<HashMap<String, CacheValue<Vec<u8>>>>;

    /// Writes a key unconditionally, or conditionally via
    /// `only_if_absent`/`only_if_present`.
    async fn set(
        &self,
        key: &str,
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        only_if_absent: bool,
        only_if_present: bool,
    ) -> CacheResult<WriteOutcome>;

    /// Replaces a key only if its current value equals `expected`.
    async fn replace_if_equal(
        &self,
        key: &str,
        expected: &[u8],
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
    ) -> CacheResult<WriteOutcome>;

    /// Removes a key unconditionally.
    async fn remove(&self, key: &str) -> CacheResult<RemoveOutcome>;

    /// Removes a key only if its current value equals `expected`.
    async fn remove_if_equal(&self, key: &str, expected: &[u8]) -> CacheResult<RemoveOutcome>;

    /// Removes several keys; not atomic as a group.
    async fn remove_many(&self, keys: &[String]) -> CacheResult<BulkRemoveOutcome>;

    /// Removes every key matching an exact byte prefix.
    async fn remove_by_prefix(&self, prefix: &str) -> CacheResult<BulkRemoveOutcome>;

    /// Removes every key (optionally restricted to the given keys when
    /// `keys` is non-empty, matching `removeAll(keys)` in `spec.md` §4.3).
    async fn remove_all(&self, keys: &[String]) -> CacheResult<BulkRemoveOutcome>;

    /// Atomically adds `delta` to the integer stored at `key`.
    async fn increment(&self, key: &str, delta: i64, ttl: Option<Duration>) -> CacheResult<IncrementOutcome>;

    /// Atomically adds `delta` to the IEEE-754 double stored at `key`.
    async fn increment_f64(&self, key: &str, delta: f64, ttl: Option<Duration>) -> CacheResult<IncrementFloatOutcome>;

    /// Atomically sets `key` to `value` only if `value` is higher than the
    /// current stored value (or the key is absent).
    async fn set_if_higher(&self, key: &str, value: i64, ttl: Option<Duration>) -> CacheResult<ThresholdOutcome>;

    /// Symmetric to `set_if_higher`, for lower values.
    async fn set_if_lower(&self, key: &str, value: i64, ttl: Option<Duration>) -> CacheResult<ThresholdOutcome>;

    /// Appends items to the list stored at `key`, creating it if absent.
    async fn list_add(&self, key: &str, items: &[Vec<u8>], ttl: Option<Duration>) -> CacheResult<ListOutcome>;

    /// Removes items from the list stored at `key`.
    async fn list_remove(&self, key: &str, items: &[Vec<u8>]) -> CacheResult<ListOutcome>;

    /// Returns the remaining TTL for a key, if any.
    async fn get_expiration(&self, key: &str) -> CacheResult<Option<Duration>>;

    /// Sets (or clears, with `None`) a key's TTL.
    async fn set_expiration(&self, key: &str, ttl: Option<Duration>) -> CacheResult<bool>;

    /// Checks for key existence without fetching its value.
    async fn exists(&self, key: &str) -> CacheResult<bool>;
}

/// A live subscription to an invalidation topic.
///
/// Dropping the subscription is the "cancelable" handle `spec.md` §6
/// describes for `subscribe`.
#[async_trait]
pub trait Subscription: Send {
    /// Waits for the next raw message, or `None` once the bus closes the
    /// subscription.
    async fn recv(&mut self) -> Option<Vec<u8>>;
}

/// Publish/subscribe transport used to fan out invalidation messages.
///
/// At-least-once delivery, fan-out to all subscribers, best-effort ordering
/// per publisher.
#[async_trait]
pub trait InvalidationBus: Send + Sync {
    /// Publishes a raw payload to `topic`.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> CacheResult<()>;

    /// Subscribes to `topic`, returning a handle that yields every message
    /// published to it (including, before self-filtering, this instance's
    /// own publishes).
    async fn subscribe(&self, topic: &str) -> CacheResult<Box<dyn Subscription>>;
}

/// Encodes and decodes `CacheValue<Vec<u8>>` for wire transport (bus
/// payloads) or for `CloneValues` round-tripping. Must preserve the
/// null/absent distinction.
pub trait Serializer: Send + Sync {
    /// Encodes a value to bytes.
    fn serialize(&self, value: &CacheValue<Vec<u8>>) -> CacheResult<Vec<u8>>;

    /// Decodes bytes produced by [`Serializer::serialize`].
    fn deserialize(&self, bytes: &[u8]) -> CacheResult<CacheValue<Vec<u8>>>;
}
