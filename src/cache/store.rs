//! Cache Store Module
//!
//! Synchronous cache engine layered on a host [`Backend`]: capacity
//! accounting, LRU eviction and the persisted recency ledger.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::codec::{self, Decoded, Encoded};
use crate::cache::{bytes, capacity, eviction, CacheEntry, CacheStats, RecencyLedger, LEDGER_KEY};
use crate::error::{CacheError, Result};
use crate::store::Backend;

// == Cache State ==
/// Lifecycle of a cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Normal operation
    Active,
    /// The host store is unavailable; every operation fails
    Unsupported,
}

// == Cache Store ==
/// Bounded LRU cache over a synchronous host store.
#[derive(Debug)]
pub struct CacheStore<B> {
    /// Host store holding entries and the ledger
    backend: B,
    /// Performance statistics
    stats: CacheStats,
    /// Soft capacity in bytes
    capacity: usize,
    state: CacheState,
}

impl<B: Backend> CacheStore<B> {
    // == Constructor ==
    /// Creates a new CacheStore over `backend` with the given soft capacity.
    ///
    /// If the backend reports itself unsupported the cache starts, and stays,
    /// in [`CacheState::Unsupported`].
    pub fn new(backend: B, capacity: usize) -> Self {
        let state = if backend.is_supported() {
            CacheState::Active
        } else {
            warn!("Host store is not supported, cache disabled");
            CacheState::Unsupported
        };

        let mut stats = CacheStats::new();
        if state == CacheState::Active {
            stats.set_total_entries(RecencyLedger::load(&backend).len());
        }

        Self {
            backend,
            stats,
            capacity,
            state,
        }
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> CacheState {
        self.state
    }

    /// Returns the soft capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the underlying host store.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn ensure_active(&self) -> Result<()> {
        match self.state {
            CacheState::Active => Ok(()),
            CacheState::Unsupported => Err(CacheError::Unsupported),
        }
    }

    fn check_key(key: &str) -> Result<()> {
        if key == LEDGER_KEY {
            return Err(CacheError::ReservedKey(key.to_string()));
        }
        Ok(())
    }

    // == Set ==
    /// Encodes and stores a value, evicting least recently used entries if
    /// the write would exceed capacity.
    pub fn set<T>(&mut self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + fmt::Debug + ?Sized,
    {
        self.set_encoded(key, codec::encode(value))
    }

    /// Stores an already encoded value.
    pub fn set_encoded(&mut self, key: &str, encoded: Encoded) -> Result<()> {
        self.ensure_active()?;
        Self::check_key(key)?;

        if encoded.is_fallback() {
            self.stats.record_degraded_write();
        }
        let value = encoded.as_str();

        let entry_size = bytes::pair_size(key, value)?;
        if entry_size > self.capacity {
            return Err(CacheError::EntryTooLarge {
                key: key.to_string(),
                size: entry_size,
                capacity: self.capacity,
            });
        }

        let mut ledger = RecencyLedger::load(&self.backend);

        // The previous value under this key is replaced, so its space counts as free
        let reclaimed = match CacheEntry::read(&self.backend, key) {
            Some(previous) => previous.size_bytes()?,
            None => 0,
        };

        let used = capacity::used_bytes(&self.backend)?;
        let available = (self.capacity + reclaimed).saturating_sub(used);

        if entry_size > available {
            let deficit = entry_size - available;
            let tracked = ledger.len();
            let incoming_tracked = ledger.contains(key);

            match eviction::ensure_space(&mut self.backend, &mut ledger, deficit, key) {
                Ok(report) => {
                    let evicted = report.evicted.iter().filter(|k| k.as_str() != key).count();
                    self.stats.record_evictions(evicted);
                    debug!(
                        "Freed {} bytes for '{}' by evicting {} entries",
                        report.freed, key, evicted
                    );
                }
                Err(e) => {
                    // Entries popped before the failure are already gone from the store
                    let mut evicted = tracked - ledger.len();
                    if incoming_tracked && !ledger.contains(key) {
                        evicted -= 1;
                    }
                    self.stats.record_evictions(evicted);
                    self.stats.set_total_entries(ledger.len());
                    return Err(e);
                }
            }
        }

        ledger.touch(key);
        ledger.persist(&mut self.backend)?;

        if let Err(e) = self.backend.set_item(key, value) {
            if self.backend.get_item(key).is_none() {
                ledger.remove(key);
                ledger.persist(&mut self.backend)?;
            }
            self.stats.set_total_entries(ledger.len());
            return Err(e.into());
        }

        self.stats.set_total_entries(ledger.len());
        Ok(())
    }

    // == Get ==
    /// Reads and decodes a value.
    ///
    /// Returns `Ok(None)` on a cache miss; a miss leaves the store untouched.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<Decoded<T>>> {
        Ok(self.get_raw(key)?.map(codec::decode))
    }

    /// Reads a value as stored, marking it most recently used.
    pub fn get_raw(&mut self, key: &str) -> Result<Option<String>> {
        self.ensure_active()?;
        Self::check_key(key)?;

        match self.backend.get_item(key) {
            Some(raw) => {
                let mut ledger = RecencyLedger::load(&self.backend);
                ledger.touch(key);
                ledger.persist(&mut self.backend)?;
                self.stats.record_hit();
                self.stats.set_total_entries(ledger.len());
                Ok(Some(raw))
            }
            None => {
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    // == Remove ==
    /// Removes an entry. Removing an absent key is not an error.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        self.ensure_active()?;
        Self::check_key(key)?;

        self.backend.remove_item(key);
        let mut ledger = RecencyLedger::load(&self.backend);
        ledger.remove(key);
        ledger.persist(&mut self.backend)?;
        self.stats.set_total_entries(ledger.len());
        Ok(())
    }

    // == Contains ==
    /// Checks whether a key is stored, without touching its recency.
    pub fn contains(&self, key: &str) -> Result<bool> {
        self.ensure_active()?;
        Self::check_key(key)?;
        Ok(self.backend.get_item(key).is_some())
    }

    // == Keys ==
    /// Cached keys, least recently used first.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.ensure_active()?;
        Ok(RecencyLedger::load(&self.backend)
            .keys()
            .map(str::to_string)
            .collect())
    }

    // == Batch Operations ==
    /// Stores several encoded values in order, stopping at the first failure.
    pub fn set_many_encoded(&mut self, entries: Vec<(String, Encoded)>) -> Result<()> {
        for (key, encoded) in entries {
            self.set_encoded(&key, encoded)?;
        }
        Ok(())
    }

    /// Reads several values in order; missing keys yield `None`.
    pub fn get_many_raw(&mut self, keys: &[String]) -> Result<Vec<Option<String>>> {
        keys.iter().map(|key| self.get_raw(key)).collect()
    }

    /// Removes several keys.
    pub fn remove_many(&mut self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }

    // == Update Each ==
    /// Reads each key, passes its decoded value through `f` and writes the
    /// result back. Missing keys are skipped. Returns how many were updated.
    pub fn update_each<T, V, F>(&mut self, keys: &[String], mut f: F) -> Result<usize>
    where
        T: DeserializeOwned,
        V: Serialize + fmt::Debug,
        F: FnMut(&str, Decoded<T>) -> V,
    {
        let mut updated = 0;
        for key in keys {
            if let Some(current) = self.get::<T>(key)? {
                let next = f(key, current);
                self.set(key, &next)?;
                updated += 1;
            }
        }
        Ok(updated)
    }

    // == Clear ==
    /// Removes every entry, the ledger included.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.backend.clear();
        self.stats.set_total_entries(0);
        Ok(())
    }

    // == Size ==
    /// Bytes occupied by cached entries. The ledger is not counted.
    pub fn size(&self) -> Result<usize> {
        self.ensure_active()?;
        capacity::used_bytes(&self.backend)
    }

    /// Bytes left under the soft capacity.
    pub fn left(&self) -> Result<i64> {
        Ok(capacity::left(self.capacity, self.size()?))
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    // == Length ==
    /// Returns the number of tracked entries.
    pub fn len(&self) -> usize {
        self.stats.total_entries
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
