//! # Invalidation Message Protocol
//!
//! The message shape published to the invalidation bus and consumed by every
//! other instance's subscriber task.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::publisher::PublisherId;

/// A single invalidation event published after an L2-modifying operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidationMessage {
    /// Identity of the emitting instance; recipients drop messages where
    /// this equals their own id.
    pub publisher_id: PublisherId,
    /// When true (and `keys` is empty), clear the entire L1.
    pub flush_all: bool,
    /// Exact keys to evict.
    pub keys: Vec<String>,
    /// Prefixes to evict by prefix match.
    pub prefixes: Vec<String>,
    /// L2's TTL at the time of the write, so recipients can align L1 TTL
    /// when they repopulate from L2 after this invalidation.
    pub expires_at: Option<Duration>,
}

impl InvalidationMessage {
    /// Builds a keyed invalidation for one or more exact keys.
    pub fn keys(publisher_id: PublisherId, keys: Vec<String>, expires_at: Option<Duration>) -> Self {
        InvalidationMessage {
            publisher_id,
            flush_all: false,
            keys,
            prefixes: Vec::new(),
            expires_at,
        }
    }

    /// Builds a prefix invalidation.
    pub fn prefix(publisher_id: PublisherId, prefix: String) -> Self {
        InvalidationMessage {
            publisher_id,
            flush_all: false,
            keys: Vec::new(),
            prefixes: vec![prefix],
            expires_at: None,
        }
    }

    /// Builds a flush-all invalidation.
    pub fn flush(publisher_id: PublisherId) -> Self {
        InvalidationMessage {
            publisher_id,
            flush_all: true,
            keys: Vec::new(),
            prefixes: Vec::new(),
            expires_at: None,
        }
    }

    /// True if a receiving instance with `own_id` must drop this message.
    pub fn is_self_originated(&self, own_id: &PublisherId) -> bool {
        &self.publisher_id == own_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_filtering_is_a_byte_compare() {
        let id = PublisherId::random();
        let other = PublisherId::random();
        let msg = InvalidationMessage::keys(id, vec!["k".into()], None);
        assert!(msg.is_self_originated(&id));
        assert!(!msg.is_self_originated(&other));
    }

    #[test]
    fn serde_roundtrip() {
        let msg = InvalidationMessage::flush(PublisherId::random());
        let json = serde_json::to_string(&msg).unwrap();
        let back: InvalidationMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.flush_all, msg.flush_all);
        assert_eq!(back.publisher_id, msg.publisher_id);
    }
}
