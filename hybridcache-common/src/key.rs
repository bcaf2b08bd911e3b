//! # Key Validation
//!
//! Keys are opaque, non-empty UTF-8 strings. Prefix operations (used by
//! `removeByPrefix` and scoped views) match on exact byte prefixes.

use crate::error::{CacheError, CacheResult};

/// Validates a key per the data model: non-empty UTF-8.
///
/// Empty strings are rejected here rather than deeper in L1/L2 so every
/// collaborator sees the same validation error.
pub fn validate_key(key: &str) -> CacheResult<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key must not be empty".into()));
    }
    Ok(())
}

/// Returns true when `key` starts with `prefix`, matching on raw bytes.
///
/// An empty prefix matches every key (`removeByPrefix("")` matches all).
pub fn matches_prefix(key: &str, prefix: &str) -> bool {
    key.as_bytes().starts_with(prefix.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_key() {
        assert!(validate_key("").is_err());
        assert!(validate_key("a").is_ok());
    }

    #[test]
    fn empty_prefix_matches_everything() {
        assert!(matches_prefix("user:1", ""));
        assert!(matches_prefix("user:1", "user:"));
        assert!(!matches_prefix("user:1", "order:"));
    }
}
