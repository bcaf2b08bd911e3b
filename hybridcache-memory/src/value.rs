//! # Stored Value
//!
//! The concrete representation an L1 entry holds. Scalars (`Int`/`Float`)
//! get their own variants so `increment`/`setIfHigher`/`setIfLower` can
//! operate on them directly without a parse/format round trip on every call.

/// Value stored in an L1 entry.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// An opaque byte payload.
    Bytes(Vec<u8>),
    /// A 64-bit signed integer, used by `increment`/`setIfHigher`/`setIfLower`.
    Int(i64),
    /// An IEEE-754 double, used by `increment_f64`.
    Float(f64),
    /// An ordered list of byte items, used by `listAdd`/`listRemove`.
    List(Vec<Vec<u8>>),
}

impl StoredValue {
    /// Accounted byte length used for size computation: the raw payload
    /// length for bytes/lists, a fixed 8 bytes for scalars.
    pub fn byte_len(&self) -> usize {
        match self {
            StoredValue::Bytes(bytes) => bytes.len(),
            StoredValue::Int(_) | StoredValue::Float(_) => 8,
            StoredValue::List(items) => items.iter().map(Vec::len).sum(),
        }
    }

    /// Reads this value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            StoredValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Reads this value as a float, if it is one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            StoredValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Reads this value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[Vec<u8>]> {
        match self {
            StoredValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(bytes: Vec<u8>) -> Self {
        StoredValue::Bytes(bytes)
    }
}
