//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error Enum ==
/// Failures reported by the host store itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The host refused the write because its own quota is spent
    #[error("Host quota of {quota} bytes exceeded while writing '{key}'")]
    QuotaExceeded { key: String, quota: usize },

    /// The host store is absent or disabled
    #[error("Host store is unavailable")]
    Unavailable,
}

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backing store is not supported; the cache is inert
    #[error("Storage backend is not supported")]
    Unsupported,

    /// Caller tried to use the key reserved for the recency ledger
    #[error("Key is reserved: {0}")]
    ReservedKey(String),

    /// A single entry is larger than the whole cache capacity
    #[error("Entry '{key}' needs {size} bytes but capacity is {capacity}")]
    EntryTooLarge {
        key: String,
        size: usize,
        capacity: usize,
    },

    /// Every evictable entry is gone and the write still does not fit
    #[error("Cannot make room for '{key}': {deficit} bytes still missing after eviction")]
    EvictionExhausted { key: String, deficit: usize },

    /// A code unit fell outside every known byte-width class
    #[error("Unknown byte width for code unit {0:#x}")]
    UnknownByteWidth(u32),

    /// Error surfaced by the host store
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
