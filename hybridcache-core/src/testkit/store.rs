//! # In-Process Fake DistributedStore
//!
//! `spec.md` §1 treats L2 as an external collaborator out of scope for this
//! design; exercising the coordinator still needs *some* concrete L2, so
//! this fake plays that role the way the teacher's
//! `hkv-client/tests/client.rs` spins up a real in-process server instead of
//! mocking the wire protocol — a deterministic double, not a mock of the
//! coordinator's own logic.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hybridcache_common::{
    BulkRemoveOutcome, CacheResult, CacheValue, DistributedStore, IncrementFloatOutcome,
    IncrementOutcome, ListOutcome, RemoveOutcome, ThresholdOutcome, WriteOutcome,
};

#[derive(Clone)]
enum Entry {
    Value(CacheValue<Vec<u8>>),
    Int(i64),
    Float(f64),
    List(Vec<Vec<u8>>),
}

struct Slot {
    entry: Entry,
    expires_at: Option<Instant>,
}

impl Slot {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

fn entry_to_bytes(entry: &Entry) -> CacheValue<Vec<u8>> {
    match entry {
        Entry::Value(v) => v.clone(),
        Entry::Int(i) => CacheValue::Value(i.to_le_bytes().to_vec()),
        Entry::Float(f) => CacheValue::Value(f.to_le_bytes().to_vec()),
        Entry::List(items) => CacheValue::Value(bincode::serialize(items).unwrap_or_default()),
    }
}

/// A single-process stand-in for the distributed store, backed by a
/// `Mutex<HashMap>`. Not a mock: every call runs real logic against real
/// state, exactly as the teacher's client tests exercise a real listener.
pub struct InMemoryStore {
    data: Mutex<HashMap<String, Slot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore { data: Mutex::new(HashMap::new()) }
    }

    fn get_live<'a>(data: &'a HashMap<String, Slot>, key: &str, now: Instant) -> Option<&'a Slot> {
        data.get(key).filter(|slot| !slot.is_expired(now))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DistributedStore for InMemoryStore {
    async fn get(&self, key: &str) -> CacheResult<CacheValue<Vec<u8>>> {
        let now = Instant::now();
        let mut data = self.data.lock().unwrap();
        if matches!(data.get(key), Some(slot) if slot.is_expired(now)) {
            data.remove(key);
        }
        Ok(Self::get_live(&data, key, now).map(|slot| entry_to_bytes(&slot.entry)).unwrap_or(CacheValue::Absent))
    }

    async fn get_many(&self, keys: &[String]) -> CacheResult<HashMap<String, CacheValue<Vec<u8>>>> {
        let now = Instant::now();
        let data = self.data.lock().unwrap();
        Ok(keys
            .iter()
            .map(|k| {
                let v = Self::get_live(&data, k, now).map(|slot| entry_to_bytes(&slot.entry)).unwrap_or(CacheValue::Absent);
                (k.clone(), v)
            })
            .collect())
    }

    async fn set(
        &self,
        key: &str,
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
        only_if_absent: bool,
        only_if_present: bool,
    ) -> CacheResult<WriteOutcome> {
        let now = Instant::now();
        let mut data = self.data.lock().unwrap();
        let present = Self::get_live(&data, key, now).is_some();
        if only_if_absent && present {
            return Ok(WriteOutcome::unchanged());
        }
        if only_if_present && !present {
            return Ok(WriteOutcome::unchanged());
        }
        data.insert(
            key.to_string(),
            Slot { entry: Entry::Value(value), expires_at: ttl.map(|d| now + d) },
        );
        Ok(WriteOutcome::changed())
    }

    async fn replace_if_equal(
        &self,
        key: &str,
        expected: &[u8],
        value: CacheValue<Vec<u8>>,
        ttl: Option<Duration>,
    ) -> CacheResult<WriteOutcome> {
        let now = Instant::now();
        let mut data = self.data.lock().unwrap();
        let matches_expected = matches!(
            Self::get_live(&data, key, now).map(|s| entry_to_bytes(&s.entry)),
            Some(CacheValue::Value(ref v)) if v.as_slice() == expected
        );
        if !matches_expected {
            return Ok(WriteOutcome::unchanged());
        }
        data.insert(
            key.to_string(),
            Slot { entry: Entry::Value(value), expires_at: ttl.map(|d| now + d) },
        );
        Ok(WriteOutcome::changed())
    }

    async fn remove(&self, key: &str) -> CacheResult<RemoveOutcome> {
        let mut data = self.data.lock().unwrap();
        Ok(RemoveOutcome { removed: data.remove(key).is_some() })
    }

    async fn remove_if_equal(&self, key: &str, expected: &[u8]) -> CacheResult<RemoveOutcome> {
        let now = Instant::now();
        let mut data = self.data.lock().unwrap();
        let matches_expected = matches!(
            Self::get_live(&data, key, now).map(|s| entry_to_bytes(&s.entry)),
            Some(CacheValue::Value(ref v)) if v.as_slice() == expected
        );
        if matches_expected {
            data.remove(key);
        }
        Ok(RemoveOutcome { removed: matches_expected })
    }

    async fn remove_many(&self, keys: &[String]) -> CacheResult<BulkRemoveOutcome> {
        let mut data = self.data.lock().unwrap();
        let removed_count = keys.iter().filter(|k| data.remove(k.as_str()).is_some()).count();
        Ok(BulkRemoveOutcome { removed_count })
    }

    async fn remove_by_prefix(&self, prefix: &str) -> CacheResult<BulkRemoveOutcome> {
        let mut data = self.data.lock().unwrap();
        let matching: Vec<String> = data.keys().filter(|k| hybridcache_common::matches_prefix(k, prefix)).cloned().collect();
        for key in &matching {
            data.remove(key);
        }
        Ok(BulkRemoveOutcome { removed_count: matching.len() })
    }

    async fn remove_all(&self, keys: &[String]) -> CacheResult<BulkRemoveOutcome> {
        let mut data = self.data.lock().unwrap();
        if keys.is_empty() {
            let removed_count = data.len();
            data.clear();
            Ok(BulkRemoveOutcome { removed_count })
        } else {
            let removed_count = keys.iter().filter(|k| data.remove(k.as_str()).is_some()).count();
            Ok(BulkRemoveOutcome { removed_count })
        }
    }

    async fn increment(&self, key: &str, delta: i64, ttl: Option<Duration>) -> CacheResult<IncrementOutcome> {
        let now = Instant::now();
        let mut data = self.data.lock().unwrap();
        let existing = match Self::get_live(&data, key, now) {
            Some(Slot { entry: Entry::Int(v), .. }) => *v,
            Some(_) | None => 0,
        };
        let value = existing + delta;
        let expires_at = ttl.map(|d| now + d).or_else(|| data.get(key).and_then(|s| s.expires_at));
        data.insert(key.to_string(), Slot { entry: Entry::Int(value), expires_at });
        Ok(IncrementOutcome { value })
    }

    async fn increment_f64(&self, key: &str, delta: f64, ttl: Option<Duration>) -> CacheResult<IncrementFloatOutcome> {
        let now = Instant::now();
        let mut data = self.data.lock().unwrap();
        let existing = match Self::get_live(&data, key, now) {
            Some(Slot { entry: Entry::Float(v), .. }) => *v,
            Some(_) | None => 0.0,
        };
        let value = existing + delta;
        let expires_at = ttl.map(|d| now + d).or_else(|| data.get(key).and_then(|s| s.expires_at));
        data.insert(key.to_string(), Slot { entry: Entry::Float(value), expires_at });
        Ok(IncrementFloatOutcome { value })
    }

    async fn set_if_higher(&self, key: &str, value: i64, ttl: Option<Duration>) -> CacheResult<ThresholdOutcome> {
        let now = Instant::now();
        let mut data = self.data.lock().unwrap();
        let existing = match Self::get_live(&data, key, now) {
            Some(Slot { entry: Entry::Int(v), .. }) => Some(*v),
            _ => None,
        };
        if existing.map(|e| value > e).unwrap_or(true) {
            let difference = value - existing.unwrap_or(0);
            data.insert(key.to_string(), Slot { entry: Entry::Int(value), expires_at: ttl.map(|d| now + d) });
            Ok(ThresholdOutcome { changed: true, difference })
        } else {
            Ok(ThresholdOutcome { changed: false, difference: 0 })
        }
    }

    async fn set_if_lower(&self, key: &str, value: i64, ttl: Option<Duration>) -> CacheResult<ThresholdOutcome> {
        let now = Instant::now();
        let mut data = self.data.lock().unwrap();
        let existing = match Self::get_live(&data, key, now) {
            Some(Slot { entry: Entry::Int(v), .. }) => Some(*v),
            _ => None,
        };
        if existing.map(|e| value < e).unwrap_or(true) {
            let difference = value - existing.unwrap_or(0);
            data.insert(key.to_string(), Slot { entry: Entry::Int(value), expires_at: ttl.map(|d| now + d) });
            Ok(ThresholdOutcome { changed: true, difference })
        } else {
            Ok(ThresholdOutcome { changed: false, difference: 0 })
        }
    }

    async fn list_add(&self, key: &str, items: &[Vec<u8>], ttl: Option<Duration>) -> CacheResult<ListOutcome> {
        let now = Instant::now();
        let mut data = self.data.lock().unwrap();
        let mut list = match Self::get_live(&data, key, now) {
            Some(Slot { entry: Entry::List(items), .. }) => items.clone(),
            _ => Vec::new(),
        };
        let mut added = 0;
        for item in items {
            if !list.contains(item) {
                list.push(item.clone());
                added += 1;
            }
        }
        data.insert(key.to_string(), Slot { entry: Entry::List(list), expires_at: ttl.map(|d| now + d) });
        Ok(ListOutcome { count: added })
    }

    async fn list_remove(&self, key: &str, items: &[Vec<u8>]) -> CacheResult<ListOutcome> {
        let now = Instant::now();
        let mut data = self.data.lock().unwrap();
        let mut list = match Self::get_live(&data, key, now) {
            Some(Slot { entry: Entry::List(items), .. }) => items.clone(),
            _ => return Ok(ListOutcome { count: 0 }),
        };
        let before = list.len();
        list.retain(|item| !items.contains(item));
        let removed = before - list.len();
        let expires_at = data.get(key).and_then(|s| s.expires_at);
        data.insert(key.to_string(), Slot { entry: Entry::List(list), expires_at });
        Ok(ListOutcome { count: removed })
    }

    async fn get_expiration(&self, key: &str) -> CacheResult<Option<Duration>> {
        let now = Instant::now();
        let data = self.data.lock().unwrap();
        Ok(Self::get_live(&data, key, now).and_then(|slot| slot.expires_at).map(|at| at.saturating_duration_since(now)))
    }

    async fn set_expiration(&self, key: &str, ttl: Option<Duration>) -> CacheResult<bool> {
        let now = Instant::now();
        let mut data = self.data.lock().unwrap();
        match data.get_mut(key) {
            Some(slot) if !slot.is_expired(now) => {
                slot.expires_at = ttl.map(|d| now + d);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let now = Instant::now();
        let data = self.data.lock().unwrap();
        Ok(Self::get_live(&data, key, now).is_some())
    }
}
