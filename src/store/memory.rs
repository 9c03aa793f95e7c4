//! In-Memory Store
//!
//! HashMap-backed [`Backend`] with an optional host quota.

use std::collections::HashMap;

use crate::error::StoreError;
use crate::store::Backend;

// == Memory Store ==
/// In-memory host store.
#[derive(Debug)]
pub struct MemoryStore {
    /// Raw key-value pairs
    items: HashMap<String, String>,
    /// Hard quota in UTF-8 bytes of keys plus values
    quota: Option<usize>,
    /// False when simulating a host without storage
    supported: bool,
}

impl MemoryStore {
    // == Constructors ==
    /// Creates an empty store without a host quota.
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            quota: None,
            supported: true,
        }
    }

    /// Creates an empty store that refuses writes beyond `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::new()
        }
    }

    /// Creates a store that reports itself as unsupported.
    pub fn disabled() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Returns the number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn occupied(&self) -> usize {
        self.items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryStore {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if !self.supported {
            return Err(StoreError::Unavailable);
        }

        if let Some(quota) = self.quota {
            let replaced = self
                .items
                .get(key)
                .map(|old| key.len() + old.len())
                .unwrap_or(0);
            let after = self.occupied() - replaced + key.len() + value.len();
            if after > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    quota,
                });
            }
        }

        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}
