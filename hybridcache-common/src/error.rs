//! # Error Taxonomy
//!
//! Purpose: Define the errors a cache operation can surface to a caller,
//! matching the propagation rules of the hybrid cache design:
//! L2 and serialization failures are user-visible, bus failures are not.

use thiserror::Error;

/// Errors surfaced by the hybrid cache and its collaborators.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A value exceeded `MaxEntrySize` while `StrictEntrySize` is set.
    #[error("entry too large: {size} bytes exceeds limit of {limit} bytes")]
    EntryTooLarge {
        /// Size of the rejected value, in bytes.
        size: usize,
        /// Configured per-entry limit, in bytes.
        limit: usize,
    },

    /// The injected `Serializer` failed to encode or decode a value.
    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    /// The distributed store (L2) round-trip failed.
    #[error("distributed store unavailable: {0}")]
    L2Unavailable(String),

    /// The invalidation bus failed to accept a publish after retries.
    ///
    /// Callers of the coordinator never observe this variant directly (per
    /// the design, bus failures are logged and swallowed); it exists so the
    /// bus trait has a concrete error type to report to the coordinator.
    #[error("invalidation bus unavailable: {0}")]
    BusUnavailable(String),

    /// The operation was cancelled before completion.
    #[error("operation cancelled")]
    Cancelled,

    /// The provided key failed validation (e.g. empty).
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Result alias used throughout the hybrid cache crates.
pub type CacheResult<T> = Result<T, CacheError>;
