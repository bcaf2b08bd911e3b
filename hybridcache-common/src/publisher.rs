//! # Publisher Identity
//!
//! Each coordinator instance carries an immutable identity, stable for its
//! lifetime, used to drop self-originated invalidations.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of a coordinator instance.
///
/// Compared by raw bytes; self-filtering is a byte compare against the
/// receiving instance's own id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublisherId([u8; 16]);

impl PublisherId {
    /// Generates a fresh random identity (the default for production use).
    pub fn random() -> Self {
        PublisherId(*Uuid::new_v4().as_bytes())
    }

    /// Builds an identity from raw bytes, primarily for tests that need a
    /// deterministic id to assert self-filtering behavior.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        PublisherId(bytes)
    }

    /// Raw byte view of this identity.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Debug for PublisherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublisherId({})", Uuid::from_bytes(self.0))
    }
}

impl fmt::Display for PublisherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Uuid::from_bytes(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_are_distinct() {
        assert_ne!(PublisherId::random(), PublisherId::random());
    }

    #[test]
    fn equality_is_byte_compare() {
        let a = PublisherId::from_bytes([1; 16]);
        let b = PublisherId::from_bytes([1; 16]);
        let c = PublisherId::from_bytes([2; 16]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
