//! # hybridcache-memory
//!
//! The L1 in-memory tier: a bounded, concurrent map with LRU/size eviction,
//! TTL, and per-entry size caps, per `spec.md` §4.1.

pub mod store;
pub mod sweeper;
pub mod value;

pub use store::{ExpirationStatus, MemoryStore, MemoryStoreConfig, StatsSnapshot};
pub use sweeper::{start_sweeper, SweeperHandle};
pub use value::StoredValue;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn set_get_roundtrip() {
        let store = MemoryStore::new();
        store.set("alpha", StoredValue::Bytes(b"value".to_vec()), None).unwrap();
        match store.get("alpha") {
            hybridcache_common::CacheValue::Value(StoredValue::Bytes(b)) => assert_eq!(b, b"value"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn null_is_distinct_from_absent() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing"), hybridcache_common::CacheValue::Absent);
        store.set_null("present", None).unwrap();
        assert_eq!(store.get("present"), hybridcache_common::CacheValue::Null);
    }

    #[test]
    fn ttl_zero_removes_instead_of_setting() {
        let store = MemoryStore::new();
        store.set("k", StoredValue::Bytes(b"v".to_vec()), None).unwrap();
        store.set("k", StoredValue::Bytes(b"v2".to_vec()), Some(Duration::ZERO)).unwrap();
        assert_eq!(store.get("k"), hybridcache_common::CacheValue::Absent);
    }

    #[test]
    fn remove_by_prefix_empty_matches_all() {
        let store = MemoryStore::new();
        store.set("a", StoredValue::Bytes(vec![]), None).unwrap();
        store.set("b", StoredValue::Bytes(vec![]), None).unwrap();
        assert_eq!(store.remove_by_prefix(""), 2);
        assert_eq!(store.item_count(), 0);
    }

    #[test]
    fn lru_evicts_least_recently_used() {
        let store = MemoryStore::with_config(MemoryStoreConfig {
            max_items: Some(10),
            ..Default::default()
        });
        for i in 0..10 {
            store.set(&format!("k{i}"), StoredValue::Bytes(vec![]), None).unwrap();
        }
        store.set("k10", StoredValue::Bytes(vec![]), None).unwrap();

        assert_eq!(store.item_count(), 10);
        assert_eq!(store.get("k0"), hybridcache_common::CacheValue::Absent);
        assert!(store.get("k10").is_present());
    }

    #[test]
    fn lru_touch_protects_recently_read_key() {
        let store = MemoryStore::with_config(MemoryStoreConfig {
            max_items: Some(2),
            ..Default::default()
        });
        store.set("a", StoredValue::Bytes(vec![]), None).unwrap();
        store.set("b", StoredValue::Bytes(vec![]), None).unwrap();
        store.get("a");
        store.set("c", StoredValue::Bytes(vec![]), None).unwrap();

        assert!(store.get("a").is_present());
        assert_eq!(store.get("b"), hybridcache_common::CacheValue::Absent);
        assert!(store.get("c").is_present());
    }

    #[test]
    fn strict_entry_size_rejects_oversized() {
        let store = MemoryStore::with_config(MemoryStoreConfig {
            max_entry_size: Some(4),
            strict_entry_size: true,
            ..Default::default()
        });
        let result = store.set("k", StoredValue::Bytes(b"too long".to_vec()), None);
        assert!(result.is_err());
    }

    #[test]
    fn non_strict_entry_size_drops_silently() {
        let store = MemoryStore::with_config(MemoryStoreConfig {
            max_entry_size: Some(4),
            strict_entry_size: false,
            ..Default::default()
        });
        let result = store.set("k", StoredValue::Bytes(b"too long".to_vec()), None);
        assert_eq!(result, Ok(false));
        assert_eq!(store.get("k"), hybridcache_common::CacheValue::Absent);
    }

    #[test]
    fn increment_creates_and_accumulates() {
        let store = MemoryStore::new();
        assert_eq!(store.increment("counter", 5, None), 5);
        assert_eq!(store.increment("counter", 3, None), 8);
    }

    #[test]
    fn increment_f64_preserves_float_semantics() {
        let store = MemoryStore::new();
        assert_eq!(store.increment_f64("f", 1.5, None), 1.5);
        assert!((store.increment_f64("f", 0.25, None) - 1.75).abs() < f64::EPSILON);
    }

    #[test]
    fn set_if_higher_only_replaces_when_greater() {
        let store = MemoryStore::new();
        assert_eq!(store.set_if_higher("hi", 10, None), 10);
        assert_eq!(store.set_if_higher("hi", 5, None), 0);
        assert_eq!(store.set_if_higher("hi", 20, None), 10);
    }

    #[test]
    fn list_add_and_remove() {
        let store = MemoryStore::new();
        let added = store.list_add("list", &[b"a".to_vec(), b"b".to_vec(), b"c".to_vec()], None);
        assert_eq!(added, 3);
        let removed = store.list_remove("list", &[b"b".to_vec()]);
        assert_eq!(removed, 1);
        match store.get("list") {
            hybridcache_common::CacheValue::Value(StoredValue::List(items)) => {
                assert_eq!(items, vec![b"a".to_vec(), b"c".to_vec()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn expiration_reports_missing_no_expiry_and_ttl() {
        let store = MemoryStore::new();
        assert_eq!(store.get_expiration("missing"), ExpirationStatus::Missing);
        store.set("k", StoredValue::Bytes(vec![]), None).unwrap();
        assert_eq!(store.get_expiration("k"), ExpirationStatus::NoExpiry);
        store.set_expiration("k", Some(Duration::from_secs(60)));
        assert!(matches!(store.get_expiration("k"), ExpirationStatus::ExpiresIn(_)));
    }
}
