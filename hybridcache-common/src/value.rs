//! # Three-State Cache Value
//!
//! Every read path returns a `CacheValue<T>` rather than `Option<T>` so
//! callers can distinguish a cached `null` from an absent key.

/// Result of a cache read: present, explicitly null, or absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue<T> {
    /// The key is present with a value.
    Value(T),
    /// The key is present but its cached value is null.
    Null,
    /// The key is absent (or expired).
    Absent,
}

impl<T> CacheValue<T> {
    /// True when the key was present (`Value` or `Null`).
    pub fn is_present(&self) -> bool {
        !matches!(self, CacheValue::Absent)
    }

    /// Converts to `Option<T>`, collapsing `Null` and `Absent` together.
    ///
    /// Useful for callers that don't care about the null/absent distinction.
    pub fn into_option(self) -> Option<T> {
        match self {
            CacheValue::Value(v) => Some(v),
            CacheValue::Null | CacheValue::Absent => None,
        }
    }

    /// Maps the contained value, leaving `Null`/`Absent` untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheValue<U> {
        match self {
            CacheValue::Value(v) => CacheValue::Value(f(v)),
            CacheValue::Null => CacheValue::Null,
            CacheValue::Absent => CacheValue::Absent,
        }
    }
}

/// Byte-sentinel wire representation of a `CacheValue` payload, used by L2
/// adapters and the bundled test doubles to round-trip the null/absent
/// distinction through a plain byte store. A dedicated single-byte tag
/// precedes the payload so `Null` never collides with an empty `Value(vec![])`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WireTag {
    Value = 0,
    Null = 1,
}

impl CacheValue<Vec<u8>> {
    /// Encodes this value for storage in a raw byte-oriented L2, preserving
    /// the null/absent distinction (absent values are never encoded).
    pub fn encode(&self) -> Option<Vec<u8>> {
        match self {
            CacheValue::Value(bytes) => {
                let mut buf = Vec::with_capacity(bytes.len() + 1);
                buf.push(WireTag::Value as u8);
                buf.extend_from_slice(bytes);
                Some(buf)
            }
            CacheValue::Null => Some(vec![WireTag::Null as u8]),
            CacheValue::Absent => None,
        }
    }

    /// Decodes bytes produced by [`CacheValue::encode`].
    pub fn decode(raw: &[u8]) -> Option<Self> {
        match raw.first() {
            Some(0) => Some(CacheValue::Value(raw[1..].to_vec())),
            Some(1) => Some(CacheValue::Null),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let value = CacheValue::Value(b"alice".to_vec());
        let encoded = value.encode().unwrap();
        assert_eq!(CacheValue::decode(&encoded), Some(value));

        let null = CacheValue::<Vec<u8>>::Null;
        let encoded = null.encode().unwrap();
        assert_eq!(CacheValue::decode(&encoded), Some(CacheValue::Null));
    }

    #[test]
    fn absent_does_not_encode() {
        assert_eq!(CacheValue::<Vec<u8>>::Absent.encode(), None);
    }

    #[test]
    fn into_option_collapses_null_and_absent() {
        assert_eq!(CacheValue::Value(1).into_option(), Some(1));
        assert_eq!(CacheValue::<i32>::Null.into_option(), None);
        assert_eq!(CacheValue::<i32>::Absent.into_option(), None);
    }
}
