//! # L1 Application Hook
//!
//! `HybridCoordinator` and `WriteAwareClient` share one write-path
//! implementation (`write_path.rs`); the only difference between them is
//! whether an L1 policy actually runs. This trait is that seam:
//! `MemoryL1` drives a real `MemoryStore`, `NoopL1` is a zero-cost stand-in
//! used by `WriteAwareClient`, which per `spec.md` §4.4 maintains no L1.

use std::sync::Arc;
use std::time::Duration;

use hybridcache_memory::{MemoryStore, StoredValue};

pub(crate) trait L1Hook: Send + Sync {
    fn set_value(&self, key: &str, value: &[u8], ttl: Option<Duration>);
    fn set_null(&self, key: &str, ttl: Option<Duration>);
    fn set_int(&self, key: &str, value: i64, ttl: Option<Duration>);
    fn set_float(&self, key: &str, value: f64, ttl: Option<Duration>);
    fn evict(&self, key: &str);
    fn evict_prefix(&self, prefix: &str);
    fn evict_all(&self);
    fn list_add(&self, key: &str, items: &[Vec<u8>], ttl: Option<Duration>);
    fn list_remove(&self, key: &str, items: &[Vec<u8>]);
    fn set_expiration(&self, key: &str, ttl: Option<Duration>);
}

/// Drives a real `MemoryStore`, used by `HybridCoordinator`.
pub(crate) struct MemoryL1(pub Arc<MemoryStore>);

impl L1Hook for MemoryL1 {
    fn set_value(&self, key: &str, value: &[u8], ttl: Option<Duration>) {
        let _ = self.0.set(key, StoredValue::Bytes(value.to_vec()), ttl);
    }

    fn set_null(&self, key: &str, ttl: Option<Duration>) {
        let _ = self.0.set_null(key, ttl);
    }

    fn set_int(&self, key: &str, value: i64, ttl: Option<Duration>) {
        let _ = self.0.set(key, StoredValue::Int(value), ttl);
    }

    fn set_float(&self, key: &str, value: f64, ttl: Option<Duration>) {
        let _ = self.0.set(key, StoredValue::Float(value), ttl);
    }

    fn evict(&self, key: &str) {
        self.0.remove(key);
    }

    fn evict_prefix(&self, prefix: &str) {
        self.0.remove_by_prefix(prefix);
    }

    fn evict_all(&self) {
        self.0.remove_all();
    }

    fn list_add(&self, key: &str, items: &[Vec<u8>], ttl: Option<Duration>) {
        self.0.list_add(key, items, ttl);
    }

    fn list_remove(&self, key: &str, items: &[Vec<u8>]) {
        self.0.list_remove(key, items);
    }

    fn set_expiration(&self, key: &str, ttl: Option<Duration>) {
        self.0.set_expiration(key, ttl);
    }
}

/// No-op L1, used by `WriteAwareClient`: every call is a pure pass-through
/// to L2 plus a publish, with nothing cached locally.
pub(crate) struct NoopL1;

impl L1Hook for NoopL1 {
    fn set_value(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) {}
    fn set_null(&self, _key: &str, _ttl: Option<Duration>) {}
    fn set_int(&self, _key: &str, _value: i64, _ttl: Option<Duration>) {}
    fn set_float(&self, _key: &str, _value: f64, _ttl: Option<Duration>) {}
    fn evict(&self, _key: &str) {}
    fn evict_prefix(&self, _prefix: &str) {}
    fn evict_all(&self) {}
    fn list_add(&self, _key: &str, _items: &[Vec<u8>], _ttl: Option<Duration>) {}
    fn list_remove(&self, _key: &str, _items: &[Vec<u8>]) {}
    fn set_expiration(&self, _key: &str, _ttl: Option<Duration>) {}
}
