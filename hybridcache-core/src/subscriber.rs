//! # Subscriber Task
//!
//! `spec.md` §4.3 "Subscriber loop": a long-running task that consumes
//! invalidation messages from the bus and applies them to L1, dropping any
//! message this instance published itself.

use std::sync::Arc;

use hybridcache_common::{CacheResult, InvalidationBus, InvalidationMessage, PublisherId};
use hybridcache_memory::MemoryStore;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::metrics::CoordinatorMetrics;

/// Owns the subscriber task; dropping (or calling [`SubscriberHandle::stop`])
/// aborts it, matching `spec.md` §9 "the coordinator exclusively owns ...
/// its subscriber task".
pub(crate) struct SubscriberHandle {
    handle: JoinHandle<()>,
}

impl SubscriberHandle {
    pub(crate) fn stop(&self) {
        self.handle.abort();
    }
}

pub(crate) async fn start_subscriber(
    l1: Arc<MemoryStore>,
    bus: Arc<dyn InvalidationBus>,
    topic: String,
    own_id: PublisherId,
    metrics: Arc<CoordinatorMetrics>,
) -> CacheResult<SubscriberHandle> {
    let mut subscription = bus.subscribe(&topic).await?;

    let handle = tokio::spawn(async move {
        while let Some(payload) = subscription.recv().await {
            metrics.record_invalidation_received();
            let message: InvalidationMessage = match bincode::deserialize(&payload) {
                Ok(msg) => msg,
                Err(err) => {
                    error!(error = %err, "failed to decode invalidation message, skipping");
                    continue;
                }
            };
            apply(&l1, &message, &own_id, &metrics);
        }
    });

    Ok(SubscriberHandle { handle })
}

fn apply(l1: &MemoryStore, message: &InvalidationMessage, own_id: &PublisherId, metrics: &CoordinatorMetrics) {
    if message.is_self_originated(own_id) {
        metrics.record_self_drop();
        return;
    }

    if message.flush_all {
        l1.remove_all();
        debug!("applied flush-all invalidation");
        metrics.record_invalidation_applied();
        return;
    }
    for prefix in &message.prefixes {
        l1.remove_by_prefix(prefix);
    }
    for key in &message.keys {
        l1.remove(key);
    }
    metrics.record_invalidation_applied();
}
