//! # hybridcache-core
//!
//! The orchestration tier of the hybrid cache: `HybridCoordinator`
//! (`spec.md` §4.3), `WriteAwareClient` (§4.4), `ScopedView` (§4.5), and the
//! subscriber task (§4.3 "Subscriber loop") that applies peer invalidations
//! to L1. `testkit` supplies in-process fakes for the external L2/bus
//! collaborators so the coordinator can be tested end to end.

mod cache;
mod config;
mod coordinator;
mod l1_hook;
mod metrics;
mod scoped_view;
mod subscriber;
mod write_aware_client;
mod write_path;

pub mod testkit;

pub use cache::Cache;
pub use config::CoordinatorConfig;
pub use coordinator::{CoordinatorStats, HybridCoordinator};
pub use metrics::MetricsSnapshot;
pub use scoped_view::ScopedView;
pub use write_aware_client::WriteAwareClient;
