//! Recency Ledger Module
//!
//! Records key usage order for LRU eviction. The ledger lives in the same
//! host store as the entries, serialized as a JSON array under
//! [`LEDGER_KEY`], and is read, mutated and written back on every change.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;
use tracing::warn;

use crate::error::{CacheError, Result};
use crate::store::Backend;

/// Store key holding the serialized ledger. Callers must not use it.
pub const LEDGER_KEY: &str = "__storey_lru__";

// == Recency Ledger ==
/// Tracks access order for LRU eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Least recently used
/// - Back = Most recently used
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecencyLedger {
    /// Order of keys by access time
    order: VecDeque<String>,
}

impl RecencyLedger {
    // == Constructor ==
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Load ==
    /// Reads the ledger from the store.
    ///
    /// A missing ledger is empty. A ledger that no longer parses is discarded
    /// and treated as empty. The reserved key and repeated keys are dropped;
    /// a repeated key keeps its most recent position.
    pub fn load<B: Backend + ?Sized>(backend: &B) -> Self {
        match backend.get_item(LEDGER_KEY) {
            None => Self::new(),
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(keys) => Self::from_keys(keys),
                Err(e) => {
                    warn!("Discarding unreadable recency ledger: {}", e);
                    Self::new()
                }
            },
        }
    }

    fn from_keys(keys: Vec<String>) -> Self {
        let stored = keys.len();
        let mut seen = HashSet::with_capacity(stored);
        let mut order = VecDeque::with_capacity(stored);

        for key in keys.into_iter().rev() {
            if key != LEDGER_KEY && seen.insert(key.clone()) {
                order.push_front(key);
            }
        }

        if order.len() != stored {
            warn!(
                "Dropped {} reserved or repeated keys from the recency ledger",
                stored - order.len()
            );
        }
        Self { order }
    }

    // == Persist ==
    /// Writes the ledger back to the store. An empty ledger removes its key.
    pub fn persist<B: Backend + ?Sized>(&self, backend: &mut B) -> Result<()> {
        if self.order.is_empty() {
            backend.remove_item(LEDGER_KEY);
            return Ok(());
        }
        backend.set_item(LEDGER_KEY, &self.encode()?)?;
        Ok(())
    }

    fn encode(&self) -> Result<String> {
        serde_json::to_string(&self.order).map_err(|e| CacheError::Internal(e.to_string()))
    }

    // == Touch ==
    /// Marks a key as most recently used (moves to back).
    ///
    /// The reserved ledger key is never tracked.
    pub fn touch(&mut self, key: &str) {
        if key == LEDGER_KEY {
            return;
        }
        self.remove(key);
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    /// Removes a key from the ledger.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if the ledger is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.front()
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }

    /// Tracked keys, least recently used first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_ledger_new() {
        let ledger = RecencyLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn test_ledger_touch_new_key() {
        let mut ledger = RecencyLedger::new();

        ledger.touch("key1");
        ledger.touch("key2");
        ledger.touch("key3");

        assert_eq!(ledger.len(), 3);
        // key1 is oldest (added first)
        assert_eq!(ledger.peek_oldest(), Some(&"key1".to_string()));
    }

    #[test]
    fn test_ledger_touch_existing_key() {
        let mut ledger = RecencyLedger::new();

        ledger.touch("key1");
        ledger.touch("key2");
        ledger.touch("key3");

        // Touch key1 again - should move to the back
        ledger.touch("key1");

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.peek_oldest(), Some(&"key2".to_string()));
        assert_eq!(ledger.keys().collect::<Vec<_>>(), vec!["key2", "key3", "key1"]);
    }

    #[test]
    fn test_ledger_touch_ignores_reserved_key() {
        let mut ledger = RecencyLedger::new();
        ledger.touch(LEDGER_KEY);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_ledger_evict_oldest() {
        let mut ledger = RecencyLedger::new();

        ledger.touch("key1");
        ledger.touch("key2");
        ledger.touch("key3");

        assert_eq!(ledger.evict_oldest(), Some("key1".to_string()));
        assert_eq!(ledger.len(), 2);

        assert_eq!(ledger.evict_oldest(), Some("key2".to_string()));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_ledger_evict_empty() {
        let mut ledger = RecencyLedger::new();
        assert_eq!(ledger.evict_oldest(), None);
    }

    #[test]
    fn test_ledger_remove() {
        let mut ledger = RecencyLedger::new();

        ledger.touch("key1");
        ledger.touch("key2");
        ledger.touch("key3");

        ledger.remove("key2");
        // Idempotent
        ledger.remove("key2");
        ledger.remove("nonexistent");

        assert_eq!(ledger.len(), 2);
        assert!(!ledger.contains("key2"));
        assert!(ledger.contains("key1"));
        assert!(ledger.contains("key3"));
    }

    #[test]
    fn test_ledger_order_after_multiple_touches() {
        let mut ledger = RecencyLedger::new();

        ledger.touch("a");
        ledger.touch("b");
        ledger.touch("c");

        // [b, c, a] after these, oldest first
        ledger.touch("a");
        ledger.touch("c");
        ledger.touch("b");

        assert_eq!(ledger.evict_oldest(), Some("a".to_string()));
        assert_eq!(ledger.evict_oldest(), Some("c".to_string()));
        assert_eq!(ledger.evict_oldest(), Some("b".to_string()));
    }

    #[test]
    fn test_ledger_touch_same_key_multiple_times() {
        let mut ledger = RecencyLedger::new();

        ledger.touch("key1");
        ledger.touch("key1");
        ledger.touch("key1");

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.evict_oldest(), Some("key1".to_string()));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_ledger_persist_and_load() {
        let mut store = MemoryStore::new();
        let mut ledger = RecencyLedger::new();
        ledger.touch("a");
        ledger.touch("b");
        ledger.persist(&mut store).unwrap();

        assert_eq!(store.get_item(LEDGER_KEY), Some(r#"["a","b"]"#.to_string()));
        assert_eq!(RecencyLedger::load(&store), ledger);
    }

    #[test]
    fn test_ledger_persist_empty_removes_key() {
        let mut store = MemoryStore::new();
        store.set_item(LEDGER_KEY, r#"["a"]"#).unwrap();

        RecencyLedger::new().persist(&mut store).unwrap();
        assert_eq!(store.get_item(LEDGER_KEY), None);
    }

    #[test]
    fn test_ledger_load_drops_reserved_and_repeated_keys() {
        let mut store = MemoryStore::new();
        let raw = format!(r#"["a","{}","b","a"]"#, LEDGER_KEY);
        store.set_item(LEDGER_KEY, &raw).unwrap();

        let ledger = RecencyLedger::load(&store);

        assert_eq!(ledger.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(!ledger.contains(LEDGER_KEY));
    }

    #[test]
    fn test_ledger_load_corrupt() {
        let mut store = MemoryStore::new();
        store.set_item(LEDGER_KEY, "{oops").unwrap();
        assert!(RecencyLedger::load(&store).is_empty());
    }
}
