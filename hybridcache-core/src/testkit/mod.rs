//! # Testkit
//!
//! In-process fakes for the external collaborators `spec.md` §1 places out
//! of scope (L2, the bus), so the coordinator can be exercised end to end
//! without a concrete production backend. Grounded in the teacher's
//! `hkv-client/tests/client.rs`, which spins up a real in-process server
//! rather than mocking the socket.

mod bus;
mod store;

pub use bus::{FailingBus, InMemoryBus};
pub use store::InMemoryStore;
