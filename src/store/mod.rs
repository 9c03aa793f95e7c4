//! Host Store Module
//!
//! The synchronous, string-keyed store the cache is layered on. Hosts provide
//! their own implementation of [`Backend`]; [`MemoryStore`] is an in-memory
//! stand-in used by tests and the demo binary.

mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;

// == Backend ==
/// A synchronous, quota-limited key-value store holding string values.
pub trait Backend: Send {
    /// Whether the host store exists and can be used at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Reads the raw value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// The host may refuse the write when its own quota is exhausted.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key` if present.
    fn remove_item(&mut self, key: &str);

    /// Returns every key currently stored, in no particular order.
    fn keys(&self) -> Vec<String>;

    /// Removes every key.
    fn clear(&mut self);
}
