//! # Background TTL Sweeper
//!
//! Supplements `spec.md` §4.1 ("background sweeps are permitted but not
//! required") with an optional periodic purge, the async analogue of the
//! teacher's `MemoryEngine::start_expirer` thread.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::store::MemoryStore;

/// Handle for a running sweeper task. Dropping it does not stop the task;
/// call [`SweeperHandle::stop`] explicitly.
pub struct SweeperHandle {
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    /// Aborts the sweeper task.
    pub fn stop(self) {
        self.handle.abort();
    }
}

/// Spawns a task that purges expired entries from `store` every `interval`.
pub fn start_sweeper(store: Arc<MemoryStore>, interval: Duration) -> SweeperHandle {
    let interval = if interval.is_zero() {
        Duration::from_millis(1)
    } else {
        interval
    };

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let removed = store.purge_expired();
            if removed > 0 {
                tracing::debug!(removed, "swept expired L1 entries");
            }
        }
    });

    SweeperHandle { handle }
}
