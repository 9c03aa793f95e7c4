//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;

/// Default soft capacity: 5 MiB, the usual quota of browser-style storage.
pub const DEFAULT_CAPACITY: usize = 1024 * 1024 * 5;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Soft capacity of the cache in bytes
    pub capacity: usize,
    /// Hard quota enforced by the host store, if any
    pub host_quota: Option<usize>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Soft capacity in bytes (default: 5242880)
    /// - `HOST_QUOTA` - Hard host quota in bytes (default: unlimited)
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
            host_quota: env::var("HOST_QUOTA").ok().and_then(|v| v.parse().ok()),
        }
    }

    /// Sets the soft capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            host_quota: None,
        }
    }
}
