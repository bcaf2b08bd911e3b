//! # hybridcache-common
//!
//! Shared types for the hybrid cache: the data model (`Key` validation,
//! `CacheValue`, `PublisherId`, `InvalidationMessage`), the error taxonomy,
//! and the capability traits external collaborators must implement
//! (`DistributedStore`, `InvalidationBus`, `Serializer`, `Clock`, `Sizer`).

pub mod clock;
pub mod error;
pub mod invalidation;
pub mod key;
pub mod publisher;
pub mod serializer;
pub mod sizer;
pub mod traits;
pub mod value;

pub use clock::{Clock, SystemClock, TestClock};
pub use error::{CacheError, CacheResult};
pub use invalidation::InvalidationMessage;
pub use key::{matches_prefix, validate_key};
pub use publisher::PublisherId;
pub use serializer::BincodeSerializer;
pub use sizer::{sizer_for, DynamicSizer, FixedSizer, Sizer, SizingMode};
pub use traits::{
    BulkRemoveOutcome, DistributedStore, IncrementFloatOutcome, IncrementOutcome, InvalidationBus,
    ListOutcome, RemoveOutcome, Serializer, Subscription, ThresholdOutcome, WriteOutcome,
};
pub use value::CacheValue;
