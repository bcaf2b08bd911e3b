//! # Coordinator Metrics
//!
//! Atomic counters in the style of the teacher's
//! `hkv-server::metrics::Metrics`/`MetricsSnapshot`: cheap accumulators with
//! a `snapshot()` that collapses them into a plain struct.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for `spec.md` §6's "Observable counters" plus the subscriber
/// counters of §4.3's subscriber loop.
#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    local_cache_hits: AtomicU64,
    invalidations_received: AtomicU64,
    invalidations_applied: AtomicU64,
    self_drops: AtomicU64,
}

impl CoordinatorMetrics {
    pub(crate) fn record_local_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.local_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_l2_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidation_received(&self) {
        self.invalidations_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidation_applied(&self) {
        self.invalidations_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_self_drop(&self) {
        self.self_drops.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time snapshot of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            local_cache_hits: self.local_cache_hits.load(Ordering::Relaxed),
            invalidations_received: self.invalidations_received.load(Ordering::Relaxed),
            invalidations_applied: self.invalidations_applied.load(Ordering::Relaxed),
            self_drops: self.self_drops.load(Ordering::Relaxed),
        }
    }
}

/// Plain-value snapshot of [`CoordinatorMetrics`], merged with the L1's own
/// `evictions`/`currentMemorySize`/`itemCount` by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Reads that found a value in L1 or L2.
    pub hits: u64,
    /// Reads absent from both L1 and L2.
    pub misses: u64,
    /// Reads served entirely from L1, without consulting L2.
    pub local_cache_hits: u64,
    /// Invalidation messages received from peers, before self-filtering.
    pub invalidations_received: u64,
    /// Invalidations applied to L1 after self-filtering.
    pub invalidations_applied: u64,
    /// Self-originated invalidations dropped by the subscriber.
    pub self_drops: u64,
}
