//! # Default Serializer
//!
//! A `bincode`-backed `Serializer` implementation, used as the default for
//! `CloneValues` round-tripping and by the bundled test doubles. Production
//! deployments may inject any other `Serializer` (the concrete wire format
//! is an external collaborator per `spec.md` §1/§6).

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};
use crate::traits::Serializer;
use crate::value::CacheValue;

#[derive(Serialize, Deserialize)]
enum WireValue {
    Value(Vec<u8>),
    Null,
}

/// `bincode`-backed `Serializer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeSerializer;

impl Serializer for BincodeSerializer {
    fn serialize(&self, value: &CacheValue<Vec<u8>>) -> CacheResult<Vec<u8>> {
        let wire = match value {
            CacheValue::Value(bytes) => WireValue::Value(bytes.clone()),
            CacheValue::Null => WireValue::Null,
            CacheValue::Absent => {
                return Err(CacheError::SerializationFailed(
                    "cannot serialize an absent value".into(),
                ))
            }
        };
        bincode::serialize(&wire).map_err(|err| CacheError::SerializationFailed(err.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> CacheResult<CacheValue<Vec<u8>>> {
        let wire: WireValue =
            bincode::deserialize(bytes).map_err(|err| CacheError::SerializationFailed(err.to_string()))?;
        Ok(match wire {
            WireValue::Value(bytes) => CacheValue::Value(bytes),
            WireValue::Null => CacheValue::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_value_and_null() {
        let serializer = BincodeSerializer;
        let value = CacheValue::Value(b"payload".to_vec());
        let encoded = serializer.serialize(&value).unwrap();
        assert_eq!(serializer.deserialize(&encoded).unwrap(), value);

        let null = CacheValue::Null;
        let encoded = serializer.serialize(&null).unwrap();
        assert_eq!(serializer.deserialize(&encoded).unwrap(), CacheValue::Null);
    }

    #[test]
    fn refuses_to_serialize_absent() {
        let serializer = BincodeSerializer;
        assert!(serializer.serialize(&CacheValue::Absent).is_err());
    }
}
