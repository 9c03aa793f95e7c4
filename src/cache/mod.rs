//! Cache Module
//!
//! Bounded LRU caching over a synchronous host store: byte accounting,
//! serialization, the persisted recency ledger and eviction.

pub mod bytes;
pub mod capacity;
pub mod codec;
pub mod eviction;
mod entry;
mod ledger;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use codec::{Decoded, Encoded};
pub use entry::CacheEntry;
pub use eviction::EvictionReport;
pub use ledger::{RecencyLedger, LEDGER_KEY};
pub use stats::CacheStats;
pub use store::{CacheState, CacheStore};
