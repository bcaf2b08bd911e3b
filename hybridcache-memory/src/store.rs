//! # MemoryStore (L1)
//!
//! Bounded, concurrent key/value map with TTL, LRU/size eviction, and
//! hit/miss/eviction counters, per `spec.md` §4.1.
//!
//! The teacher's `MemoryEngine` (`hkv-engine/src/memory.rs`) shards its map
//! across `N` `RwLock`-guarded partitions and evicts round-robin across
//! shards, which is an acceptable approximation for a raw KV engine but
//! cannot guarantee the single, exact least-recently-used victim the
//! testable properties in `spec.md` §8 require ("the least recently
//! accessed key is evicted"). This store keeps the teacher's intrusive,
//! index-based LRU list and slot-recycling free list, generalized to a
//! single unsharded instance behind one lock so LRU order is exact.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ahash::RandomState;
use hashbrown::HashMap as HbMap;
use parking_lot::RwLock;

use hybridcache_common::{sizer_for, CacheValue, Sizer, SizingMode};

use crate::value::StoredValue;

/// TTL state of a key, mirroring the teacher's `TtlStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationStatus {
    /// The key does not exist (or has expired).
    Missing,
    /// The key exists with no expiration.
    NoExpiry,
    /// The key expires after the given duration.
    ExpiresIn(Duration),
}

/// Configuration for a `MemoryStore`.
#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
    /// Upper bound on entry count; `None` disables LRU-by-count eviction.
    pub max_items: Option<usize>,
    /// Upper bound on accounted bytes; `None` disables size-based eviction.
    pub max_memory_size: Option<usize>,
    /// Per-entry byte cap; oversized entries are dropped or rejected.
    pub max_entry_size: Option<usize>,
    /// When true, an oversized entry fails `set` with `EntryTooLarge`
    /// instead of being silently dropped.
    pub strict_entry_size: bool,
    /// Size accounting strategy.
    pub sizing_mode: SizingMode,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        MemoryStoreConfig {
            max_items: None,
            max_memory_size: None,
            max_entry_size: None,
            strict_entry_size: false,
            sizing_mode: SizingMode::Dynamic,
        }
    }
}

enum Slot {
    Value(StoredValue),
    Null,
}

struct Node {
    key: Arc<str>,
    slot: Slot,
    expires_at: Option<Instant>,
    size: usize,
    created: Instant,
    last_access: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

impl Node {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if now >= deadline)
    }
}

struct Inner {
    map: HbMap<Arc<str>, usize, RandomState>,
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl Inner {
    fn new(hash_state: RandomState) -> Self {
        Inner {
            map: HbMap::with_hasher(hash_state),
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    fn lru_remove(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.nodes[idx].as_ref().expect("node exists");
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.nodes[p].as_mut().expect("node exists").next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].as_mut().expect("node exists").prev = prev,
            None => self.tail = prev,
        }
        if let Some(node) = self.nodes[idx].as_mut() {
            node.prev = None;
            node.next = None;
        }
    }

    fn lru_push_back(&mut self, idx: usize) {
        let tail = self.tail;
        if let Some(node) = self.nodes[idx].as_mut() {
            node.prev = tail;
            node.next = None;
        }
        match tail {
            Some(t) => self.nodes[t].as_mut().expect("node exists").next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    fn touch(&mut self, idx: usize, tick: u64) {
        if let Some(node) = self.nodes[idx].as_mut() {
            node.last_access = tick;
        }
        if self.tail == Some(idx) {
            return;
        }
        self.lru_remove(idx);
        self.lru_push_back(idx);
    }

    fn alloc_slot(&mut self) -> usize {
        self.free.pop().unwrap_or_else(|| {
            self.nodes.push(None);
            self.nodes.len() - 1
        })
    }

    fn remove_idx(&mut self, idx: usize) -> usize {
        self.lru_remove(idx);
        let node = self.nodes[idx].take().expect("node exists");
        self.map.remove(&node.key);
        self.free.push(idx);
        node.size
    }

    fn pop_lru(&mut self) -> Option<usize> {
        let idx = self.head?;
        Some(self.remove_idx(idx))
    }
}

/// Counters observable per `spec.md` §6.
#[derive(Debug, Default)]
pub struct StoreStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
}

impl StoreStats {
    /// Point-in-time snapshot of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Plain-value snapshot of [`StoreStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Bounded, thread-safe L1 cache with LRU, TTL, and optional size
/// accounting.
pub struct MemoryStore {
    inner: RwLock<Inner>,
    config: MemoryStoreConfig,
    sizer: Box<dyn Sizer>,
    used_bytes: AtomicUsize,
    item_count: AtomicUsize,
    tick: AtomicU64,
    stats: StoreStats,
}

impl MemoryStore {
    /// Creates a store with default (unbounded) configuration.
    pub fn new() -> Self {
        Self::with_config(MemoryStoreConfig::default())
    }

    /// Creates a store with explicit limits and sizing strategy.
    pub fn with_config(config: MemoryStoreConfig) -> Self {
        let sizer = sizer_for(config.sizing_mode);
        MemoryStore {
            inner: RwLock::new(Inner::new(RandomState::new())),
            config,
            sizer,
            used_bytes: AtomicUsize::new(0),
            item_count: AtomicUsize::new(0),
            tick: AtomicU64::new(0),
            stats: StoreStats::default(),
        }
    }

    /// Current accounted byte usage.
    pub fn current_memory_size(&self) -> usize {
        self.used_bytes.load(Ordering::Relaxed)
    }

    /// Current live entry count.
    pub fn item_count(&self) -> usize {
        self.item_count.load(Ordering::Relaxed)
    }

    /// Snapshot of hit/miss/eviction counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn next_tick(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::Relaxed)
    }

    fn deadline(&self, now: Instant, ttl: Option<Duration>) -> Option<Instant> {
        ttl.map(|d| now + d)
    }

    /// Reads a single key, promoting it to most-recently-used.
    pub fn get(&self, key: &str) -> CacheValue<StoredValue> {
        let now = Instant::now();
        let tick = self.next_tick();
        let mut inner = self.inner.write();

        let idx = match inner.map.get(key) {
            Some(&idx) => idx,
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                return CacheValue::Absent;
            }
        };

        if inner.nodes[idx].as_ref().expect("node exists").is_expired(now) {
            let size = inner.remove_idx(idx);
            self.used_bytes.fetch_sub(size, Ordering::Relaxed);
            self.item_count.fetch_sub(1, Ordering::Relaxed);
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return CacheValue::Absent;
        }

        inner.touch(idx, tick);
        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        match &inner.nodes[idx].as_ref().expect("node exists").slot {
            Slot::Value(v) => CacheValue::Value(v.clone()),
            Slot::Null => CacheValue::Null,
        }
    }

    /// Reads multiple keys; each key is resolved independently (not a
    /// snapshot).
    pub fn get_many(&self, keys: &[String]) -> HashMap<String, CacheValue<StoredValue>> {
        keys.iter()
            .map(|k| (k.clone(), self.get(k)))
            .collect()
    }

    fn size_for(&self, key: &str, value: &StoredValue) -> usize {
        // Only the dynamic sizer inspects the actual payload; fixed sizing
        // still routes through `Sizer` for a single seam (spec.md §9).
        match value {
            StoredValue::Bytes(bytes) => self.sizer.size_of(key, bytes),
            StoredValue::List(items) => {
                let joined_len: usize = items.iter().map(Vec::len).sum();
                self.sizer.size_of(key, &vec![0u8; joined_len])
            }
            StoredValue::Int(_) | StoredValue::Float(_) => self.sizer.size_of(key, &[0u8; 8]),
        }
    }

    fn entry_too_large(&self, size: usize) -> bool {
        matches!(self.config.max_entry_size, Some(limit) if size > limit)
    }

    /// Inserts or replaces `key` unconditionally.
    ///
    /// A `ttl` of zero or negative removes the key instead of writing it.
    /// `ttl == None` means no expiration.
    pub fn set(&self, key: &str, value: StoredValue, ttl: Option<Duration>) -> Result<bool, usize> {
        self.set_slot(key, Slot::Value(value), ttl)
    }

    /// Sets an explicit cached-null entry for `key`.
    pub fn set_null(&self, key: &str, ttl: Option<Duration>) -> Result<bool, usize> {
        self.set_slot(key, Slot::Null, ttl)
    }

    fn slot_size(&self, key: &str, slot: &Slot) -> usize {
        match slot {
            Slot::Value(v) => self.size_for(key, v),
            Slot::Null => self.sizer.size_of(key, &[]),
        }
    }

    /// `Ok(true)`: written. `Ok(false)`: removed (non-positive ttl) or
    /// silently dropped as oversized (non-strict mode). `Err(size)`: strict
    /// mode rejected an oversized entry; `size` is the computed size so the
    /// caller can build `CacheError::EntryTooLarge`.
    fn set_slot(&self, key: &str, slot: Slot, ttl: Option<Duration>) -> Result<bool, usize> {
        if let Some(d) = ttl {
            if d.is_zero() {
                self.remove(key);
                return Ok(false);
            }
        }

        let size = self.slot_size(key, &slot);
        if self.entry_too_large(size) {
            if self.config.strict_entry_size {
                return Err(size);
            }
            tracing::warn!(key, size, "dropping oversized entry (non-strict MaxEntrySize)");
            self.remove(key);
            return Ok(false);
        }

        let now = Instant::now();
        let tick = self.next_tick();
        let expires_at = self.deadline(now, ttl);
        let key_arc: Arc<str> = Arc::from(key);

        let mut inner = self.inner.write();
        if let Some(&idx) = inner.map.get(key) {
            let old_size = inner.nodes[idx].as_ref().expect("node exists").size;
            let node = inner.nodes[idx].as_mut().expect("node exists");
            node.slot = slot;
            node.expires_at = expires_at;
            node.size = size;
            inner.touch(idx, tick);
            self.adjust_usage(old_size, size);
        } else {
            let idx = inner.alloc_slot();
            inner.nodes[idx] = Some(Node {
                key: Arc::clone(&key_arc),
                slot,
                expires_at,
                size,
                created: now,
                last_access: tick,
                prev: None,
                next: None,
            });
            inner.lru_push_back(idx);
            inner.map.insert(key_arc, idx);
            self.used_bytes.fetch_add(size, Ordering::Relaxed);
            self.item_count.fetch_add(1, Ordering::Relaxed);
        }
        drop(inner);
        self.evict_if_needed();
        Ok(true)
    }

    fn adjust_usage(&self, old_size: usize, new_size: usize) {
        if new_size > old_size {
            self.used_bytes.fetch_add(new_size - old_size, Ordering::Relaxed);
        } else if old_size > new_size {
            self.used_bytes.fetch_sub(old_size - new_size, Ordering::Relaxed);
        }
    }

    /// Inserts `key` only if it is absent or expired.
    pub fn add(&self, key: &str, value: StoredValue, ttl: Option<Duration>) -> bool {
        if self.is_live(key) {
            return false;
        }
        matches!(self.set(key, value, ttl), Ok(true))
    }

    /// Replaces `key`'s value only if it is currently present.
    pub fn replace(&self, key: &str, value: StoredValue, ttl: Option<Duration>) -> bool {
        if !self.is_live(key) {
            return false;
        }
        matches!(self.set(key, value, ttl), Ok(true))
    }

    /// Replaces `key`'s value only if its current value equals `expected`.
    pub fn replace_if_equal(
        &self,
        key: &str,
        expected: &StoredValue,
        value: StoredValue,
        ttl: Option<Duration>,
    ) -> bool {
        let now = Instant::now();
        let matches = {
            let inner = self.inner.read();
            inner.map.get(key).and_then(|&idx| {
                let node = inner.nodes[idx].as_ref()?;
                if node.is_expired(now) {
                    return Some(false);
                }
                Some(matches!(&node.slot, Slot::Value(v) if v == expected))
            })
        };
        if matches != Some(true) {
            return false;
        }
        matches!(self.set(key, value, ttl), Ok(true))
    }

    fn is_live(&self, key: &str) -> bool {
        let now = Instant::now();
        let inner = self.inner.read();
        match inner.map.get(key) {
            Some(&idx) => !inner.nodes[idx].as_ref().expect("node exists").is_expired(now),
            None => false,
        }
    }

    /// Removes `key` unconditionally.
    pub fn remove(&self, key: &str) -> bool {
        let mut inner = self.inner.write();
        let idx = match inner.map.get(key) {
            Some(&idx) => idx,
            None => return false,
        };
        let was_live = !inner.nodes[idx].as_ref().expect("node exists").is_expired(Instant::now());
        let size = inner.remove_idx(idx);
        self.used_bytes.fetch_sub(size, Ordering::Relaxed);
        self.item_count.fetch_sub(1, Ordering::Relaxed);
        was_live
    }

    /// Removes `key` only if its current value equals `expected`.
    pub fn remove_if_equal(&self, key: &str, expected: &StoredValue) -> bool {
        let now = Instant::now();
        let mut inner = self.inner.write();
        let idx = match inner.map.get(key) {
            Some(&idx) => idx,
            None => return false,
        };
        let node = inner.nodes[idx].as_ref().expect("node exists");
        if node.is_expired(now) {
            let size = inner.remove_idx(idx);
            self.used_bytes.fetch_sub(size, Ordering::Relaxed);
            self.item_count.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        let matches = matches!(&node.slot, Slot::Value(v) if v == expected);
        if !matches {
            return false;
        }
        let size = inner.remove_idx(idx);
        self.used_bytes.fetch_sub(size, Ordering::Relaxed);
        self.item_count.fetch_sub(1, Ordering::Relaxed);
        true
    }

    /// Removes several keys; returns the count actually removed.
    pub fn remove_many(&self, keys: &[String]) -> usize {
        keys.iter().filter(|k| self.remove(k)).count()
    }

    /// Removes every key matching an exact byte prefix (`""` matches all).
    pub fn remove_by_prefix(&self, prefix: &str) -> usize {
        let matching: Vec<String> = {
            let inner = self.inner.read();
            inner
                .map
                .keys()
                .filter(|k| hybridcache_common::matches_prefix(k, prefix))
                .map(|k| k.to_string())
                .collect()
        };
        matching.iter().filter(|k| self.remove(k)).count()
    }

    /// Removes every key.
    pub fn remove_all(&self) -> usize {
        let mut inner = self.inner.write();
        let removed = inner.map.len();
        *inner = Inner::new(RandomState::new());
        self.used_bytes.store(0, Ordering::Relaxed);
        self.item_count.store(0, Ordering::Relaxed);
        removed
    }

    /// Atomically adds `delta` to the integer at `key`, creating it at `0`
    /// if absent. `ttl == None` retains the key's existing expiration (or
    /// leaves a new key without one).
    pub fn increment(&self, key: &str, delta: i64, ttl: Option<Duration>) -> i64 {
        self.arith(
            key,
            ttl,
            |existing| existing.and_then(StoredValue::as_int).unwrap_or(0) + delta,
            StoredValue::Int,
        )
    }

    /// Floating-point counterpart of [`MemoryStore::increment`].
    pub fn increment_f64(&self, key: &str, delta: f64, ttl: Option<Duration>) -> f64 {
        self.arith(
            key,
            ttl,
            |existing| existing.and_then(StoredValue::as_float).unwrap_or(0.0) + delta,
            StoredValue::Float,
        )
    }

    fn arith<T: Copy>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: impl FnOnce(Option<&StoredValue>) -> T,
        wrap: impl FnOnce(T) -> StoredValue,
    ) -> T {
        let now = Instant::now();
        let tick = self.next_tick();
        let mut inner = self.inner.write();

        if let Some(&idx) = inner.map.get(key) {
            let expired = inner.nodes[idx].as_ref().expect("node exists").is_expired(now);
            if expired {
                let size = inner.remove_idx(idx);
                self.used_bytes.fetch_sub(size, Ordering::Relaxed);
                self.item_count.fetch_sub(1, Ordering::Relaxed);
            } else {
                let existing_value = match &inner.nodes[idx].as_ref().expect("node exists").slot {
                    Slot::Value(v) => Some(v.clone()),
                    Slot::Null => None,
                };
                let new_value = compute(existing_value.as_ref());
                let wrapped = wrap(new_value);
                let new_size = self.size_for(key, &wrapped);
                let old_size = inner.nodes[idx].as_ref().expect("node exists").size;
                let node = inner.nodes[idx].as_mut().expect("node exists");
                node.slot = Slot::Value(wrapped);
                node.size = new_size;
                if let Some(d) = ttl {
                    node.expires_at = Some(now + d);
                }
                inner.touch(idx, tick);
                self.adjust_usage(old_size, new_size);
                drop(inner);
                self.evict_if_needed();
                return new_value;
            }
        }

        let new_value = compute(None);
        let wrapped = wrap(new_value);
        let size = self.size_for(key, &wrapped);
        let key_arc: Arc<str> = Arc::from(key);
        let idx = inner.alloc_slot();
        inner.nodes[idx] = Some(Node {
            key: Arc::clone(&key_arc),
            slot: Slot::Value(wrapped),
            expires_at: self.deadline(now, ttl),
            size,
            created: now,
            last_access: tick,
            prev: None,
            next: None,
        });
        inner.lru_push_back(idx);
        inner.map.insert(key_arc, idx);
        self.used_bytes.fetch_add(size, Ordering::Relaxed);
        self.item_count.fetch_add(1, Ordering::Relaxed);
        drop(inner);
        self.evict_if_needed();
        new_value
    }

    /// Sets `key` to `value` only if it is higher than the current value
    /// (or the key is absent). Returns the signed difference applied, or
    /// `0` if unchanged.
    pub fn set_if_higher(&self, key: &str, value: i64, ttl: Option<Duration>) -> i64 {
        self.threshold(key, value, ttl, |current, candidate| candidate > current)
    }

    /// Symmetric to [`MemoryStore::set_if_higher`].
    pub fn set_if_lower(&self, key: &str, value: i64, ttl: Option<Duration>) -> i64 {
        self.threshold(key, value, ttl, |current, candidate| candidate < current)
    }

    fn threshold(&self, key: &str, value: i64, ttl: Option<Duration>, wins: impl Fn(i64, i64) -> bool) -> i64 {
        let current = match self.get(key) {
            CacheValue::Value(v) => v.as_int(),
            _ => None,
        };
        match current {
            Some(existing) if !wins(existing, value) => 0,
            Some(existing) => {
                self.set(key, StoredValue::Int(value), ttl).ok();
                value - existing
            }
            None => {
                self.set(key, StoredValue::Int(value), ttl).ok();
                value
            }
        }
    }

    /// Appends `items` to the list at `key`, creating it if absent.
    /// Returns the number of items actually appended (duplicates already
    /// present are still appended; de-duplication, if any, is an L2
    /// concern this store does not second-guess).
    pub fn list_add(&self, key: &str, items: &[Vec<u8>], ttl: Option<Duration>) -> usize {
        let now = Instant::now();
        let tick = self.next_tick();
        let mut inner = self.inner.write();

        if let Some(&idx) = inner.map.get(key) {
            if inner.nodes[idx].as_ref().expect("node exists").is_expired(now) {
                let size = inner.remove_idx(idx);
                self.used_bytes.fetch_sub(size, Ordering::Relaxed);
                self.item_count.fetch_sub(1, Ordering::Relaxed);
            } else {
                let old_size = inner.nodes[idx].as_ref().expect("node exists").size;
                let node = inner.nodes[idx].as_mut().expect("node exists");
                let list = match &mut node.slot {
                    Slot::Value(StoredValue::List(list)) => list,
                    _ => {
                        node.slot = Slot::Value(StoredValue::List(Vec::new()));
                        match &mut node.slot {
                            Slot::Value(StoredValue::List(list)) => list,
                            _ => unreachable!(),
                        }
                    }
                };
                list.extend_from_slice(items);
                let new_size = self.size_for(key, &node_value_clone(node));
                node.size = new_size;
                if let Some(d) = ttl {
                    node.expires_at = Some(now + d);
                }
                inner.touch(idx, tick);
                self.adjust_usage(old_size, new_size);
                drop(inner);
                self.evict_if_needed();
                return items.len();
            }
        }

        let value = StoredValue::List(items.to_vec());
        let size = self.size_for(key, &value);
        let key_arc: Arc<str> = Arc::from(key);
        let idx = inner.alloc_slot();
        inner.nodes[idx] = Some(Node {
            key: Arc::clone(&key_arc),
            slot: Slot::Value(value),
            expires_at: self.deadline(now, ttl),
            size,
            created: now,
            last_access: tick,
            prev: None,
            next: None,
        });
        inner.lru_push_back(idx);
        inner.map.insert(key_arc, idx);
        self.used_bytes.fetch_add(size, Ordering::Relaxed);
        self.item_count.fetch_add(1, Ordering::Relaxed);
        drop(inner);
        self.evict_if_needed();
        items.len()
    }

    /// Removes `items` from the list at `key`. Returns the number of
    /// elements actually removed.
    pub fn list_remove(&self, key: &str, items: &[Vec<u8>]) -> usize {
        let now = Instant::now();
        let tick = self.next_tick();
        let mut inner = self.inner.write();

        let idx = match inner.map.get(key) {
            Some(&idx) => idx,
            None => return 0,
        };
        if inner.nodes[idx].as_ref().expect("node exists").is_expired(now) {
            let size = inner.remove_idx(idx);
            self.used_bytes.fetch_sub(size, Ordering::Relaxed);
            self.item_count.fetch_sub(1, Ordering::Relaxed);
            return 0;
        }

        let old_size = inner.nodes[idx].as_ref().expect("node exists").size;
        let node = inner.nodes[idx].as_mut().expect("node exists");
        let removed = match &mut node.slot {
            Slot::Value(StoredValue::List(list)) => {
                let before = list.len();
                list.retain(|item| !items.contains(item));
                before - list.len()
            }
            _ => 0,
        };
        if removed > 0 {
            let new_size = self.size_for(key, &node_value_clone(node));
            node.size = new_size;
            inner.touch(idx, tick);
            self.adjust_usage(old_size, new_size);
        }
        removed
    }

    /// Returns the remaining TTL for `key`.
    pub fn get_expiration(&self, key: &str) -> ExpirationStatus {
        let now = Instant::now();
        let mut inner = self.inner.write();
        let idx = match inner.map.get(key) {
            Some(&idx) => idx,
            None => return ExpirationStatus::Missing,
        };
        let node = inner.nodes[idx].as_ref().expect("node exists");
        match node.expires_at {
            None => ExpirationStatus::NoExpiry,
            Some(deadline) if deadline > now => ExpirationStatus::ExpiresIn(deadline - now),
            Some(_) => {
                let size = inner.remove_idx(idx);
                self.used_bytes.fetch_sub(size, Ordering::Relaxed);
                self.item_count.fetch_sub(1, Ordering::Relaxed);
                ExpirationStatus::Missing
            }
        }
    }

    /// Sets (or clears, with `None`) the TTL on an existing key. A
    /// non-positive `ttl` removes the key. Returns whether the key existed.
    pub fn set_expiration(&self, key: &str, ttl: Option<Duration>) -> bool {
        if let Some(d) = ttl {
            if d.is_zero() {
                return self.remove(key);
            }
        }
        let now = Instant::now();
        let mut inner = self.inner.write();
        let idx = match inner.map.get(key) {
            Some(&idx) => idx,
            None => return false,
        };
        if inner.nodes[idx].as_ref().expect("node exists").is_expired(now) {
            let size = inner.remove_idx(idx);
            self.used_bytes.fetch_sub(size, Ordering::Relaxed);
            self.item_count.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        inner.nodes[idx].as_mut().expect("node exists").expires_at = self.deadline(now, ttl);
        true
    }

    /// Removes every expired entry. Intended for periodic background
    /// sweeps (`spec.md` §4.1 permits but does not require this).
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.write();
        let expired: Vec<usize> = inner
            .map
            .values()
            .copied()
            .filter(|&idx| inner.nodes[idx].as_ref().expect("node exists").is_expired(now))
            .collect();
        let mut removed = 0;
        for idx in expired {
            let size = inner.remove_idx(idx);
            self.used_bytes.fetch_sub(size, Ordering::Relaxed);
            self.item_count.fetch_sub(1, Ordering::Relaxed);
            removed += 1;
        }
        removed
    }

    /// Evicts until both `MaxItems` and `MaxMemorySize` are satisfied.
    ///
    /// Per `spec.md` §4.1, global-cap eviction scores by a combination of
    /// smallness, age, and staleness; this store applies that score only
    /// when `MaxMemorySize` is the active constraint, and falls back to
    /// strict least-recently-used order for `MaxItems`, matching the
    /// testable LRU-bound scenario in `spec.md` §8.
    fn evict_if_needed(&self) {
        if let Some(max_items) = self.config.max_items {
            while self.item_count.load(Ordering::Relaxed) > max_items {
                let mut inner = self.inner.write();
                match inner.pop_lru() {
                    Some(size) => {
                        self.used_bytes.fetch_sub(size, Ordering::Relaxed);
                        self.item_count.fetch_sub(1, Ordering::Relaxed);
                        self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                    }
                    None => break,
                }
            }
        }

        if let Some(max_bytes) = self.config.max_memory_size {
            while self.used_bytes.load(Ordering::Relaxed) > max_bytes {
                let mut inner = self.inner.write();
                let victim = self.pick_eviction_victim(&inner);
                match victim {
                    Some(idx) => {
                        let size = inner.remove_idx(idx);
                        self.used_bytes.fetch_sub(size, Ordering::Relaxed);
                        self.item_count.fetch_sub(1, Ordering::Relaxed);
                        self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                    }
                    None => break,
                }
            }
        }
    }

    /// Scores every live node by smallness, age, and staleness and returns
    /// the worst (highest-score) index; ties favor the older `last_access`.
    fn pick_eviction_victim(&self, inner: &Inner) -> Option<usize> {
        let now = Instant::now();
        inner
            .map
            .values()
            .copied()
            .filter_map(|idx| {
                let node = inner.nodes[idx].as_ref()?;
                let age_secs = now.duration_since(node.created).as_secs_f64();
                let staleness = (self.tick.load(Ordering::Relaxed).saturating_sub(node.last_access)) as f64;
                // Smaller entries, older entries, and more-stale entries
                // score higher (more evictable). Size is inverted so that a
                // 1-byte entry scores much higher than a 1MB one.
                let size_component = 1.0 / (node.size.max(1) as f64);
                let score = size_component + age_secs + staleness;
                Some((idx, score, node.last_access))
            })
            .max_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b.2.cmp(&a.2))
            })
            .map(|(idx, _, _)| idx)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn node_value_clone(node: &Node) -> StoredValue {
    match &node.slot {
        Slot::Value(v) => v.clone(),
        Slot::Null => StoredValue::Bytes(Vec::new()),
    }
}
