//! Storey - A bounded LRU cache over a quota-limited string store
//!
//! Layers capacity accounting and least-recently-used eviction on top of a
//! synchronous, browser-style key-value store, and exposes a deferred
//! get/set/remove API through a FIFO task queue.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod store;
pub mod tasks;

pub use api::Storage;
pub use cache::{CacheState, CacheStats, CacheStore, Decoded, Encoded, LEDGER_KEY};
pub use config::Config;
pub use error::{CacheError, Result, StoreError};
pub use store::{Backend, MemoryStore};
