//! Cache Entry Module
//!
//! A stored key together with its encoded value.

use crate::cache::bytes;
use crate::error::Result;
use crate::store::Backend;

// == Cache Entry ==
/// Represents a single entry as it sits in the host store.
///
/// The size is derived from the key and value on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The entry key
    pub key: String,
    /// The encoded value
    pub value: String,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    // == Read ==
    /// Loads the entry stored under `key`, if any.
    pub fn read<B: Backend + ?Sized>(backend: &B, key: &str) -> Option<Self> {
        backend.get_item(key).map(|value| Self::new(key, value))
    }

    // == Size ==
    /// Returns the number of bytes the entry occupies.
    pub fn size_bytes(&self) -> Result<usize> {
        bytes::pair_size(&self.key, &self.value)
    }
}
