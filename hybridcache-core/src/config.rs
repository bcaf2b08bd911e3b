//! # Coordinator Configuration
//!
//! Mirrors the teacher's `ClientConfig`/`PoolConfig` pattern: a plain struct
//! with `Default`, built directly or through `with_*` fluent setters rather
//! than a separate builder type.

use std::sync::Arc;

use hybridcache_common::{PublisherId, Serializer, SizingMode};
use hybridcache_memory::MemoryStoreConfig;

/// Configuration for a [`crate::HybridCoordinator`].
pub struct CoordinatorConfig {
    /// L1 sizing/eviction limits, forwarded to `MemoryStore`.
    pub memory: MemoryStoreConfig,
    /// Invalidation topic shared by every participant of this cache domain.
    pub topic: String,
    /// Override for this instance's publisher identity. Defaults to a fresh
    /// random id; tests override it to assert self-filtering behavior.
    pub publisher_id: PublisherId,
    /// When true, values are round-tripped through `serializer` before
    /// entering L1, isolating the caller's buffer from the cached copy.
    pub clone_values: bool,
    /// Required when `clone_values` is true.
    pub serializer: Option<Arc<dyn Serializer>>,
}

impl CoordinatorConfig {
    /// Starts from defaults: unbounded L1, a fresh random publisher id, the
    /// literal topic `"cache-invalidation"`, and `clone_values` disabled.
    pub fn new(topic: impl Into<String>) -> Self {
        CoordinatorConfig {
            memory: MemoryStoreConfig::default(),
            topic: topic.into(),
            publisher_id: PublisherId::random(),
            clone_values: false,
            serializer: None,
        }
    }

    /// Overrides the L1 configuration.
    pub fn with_memory(mut self, memory: MemoryStoreConfig) -> Self {
        self.memory = memory;
        self
    }

    /// Overrides `SizingMode` directly.
    pub fn with_sizing_mode(mut self, mode: SizingMode) -> Self {
        self.memory.sizing_mode = mode;
        self
    }

    /// Pins the publisher identity, primarily for tests.
    pub fn with_publisher_id(mut self, id: PublisherId) -> Self {
        self.publisher_id = id;
        self
    }

    /// Enables `CloneValues`, round-tripping through `serializer`.
    pub fn with_clone_values(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.clone_values = true;
        self.serializer = Some(serializer);
        self
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig::new("cache-invalidation")
    }
}
