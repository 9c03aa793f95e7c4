//! Eviction Manager
//!
//! Frees space by evicting least recently used entries until a deficit is met.

use tracing::{debug, warn};

use crate::cache::{CacheEntry, RecencyLedger};
use crate::error::{CacheError, Result};
use crate::store::Backend;

// == Eviction Report ==
/// What a call to [`ensure_space`] removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionReport {
    /// Evicted keys, in eviction order
    pub evicted: Vec<String>,
    /// Bytes freed by the evictions
    pub freed: usize,
}

// == Ensure Space ==
/// Evicts entries in strict least-recently-used order until `deficit` bytes
/// have been freed.
///
/// `incoming` is the key about to be written. Its current entry has already
/// been credited by the caller, so evicting it frees nothing further.
///
/// When the ledger runs dry before the deficit is met, the ledger is written
/// back (so already-evicted keys stay out of it) and
/// [`CacheError::EvictionExhausted`] is returned.
pub fn ensure_space<B: Backend + ?Sized>(
    backend: &mut B,
    ledger: &mut RecencyLedger,
    mut deficit: usize,
    incoming: &str,
) -> Result<EvictionReport> {
    let mut report = EvictionReport::default();

    while deficit > 0 {
        let Some(victim) = ledger.evict_oldest() else {
            warn!(
                "Eviction exhausted with {} bytes still needed for '{}'",
                deficit, incoming
            );
            ledger.persist(backend)?;
            return Err(CacheError::EvictionExhausted {
                key: incoming.to_string(),
                deficit,
            });
        };

        let freed = match CacheEntry::read(backend, &victim) {
            Some(entry) if victim != incoming => entry.size_bytes()?,
            Some(_) => 0,
            None => {
                warn!("Ledger referenced missing key '{}'", victim);
                0
            }
        };

        backend.remove_item(&victim);
        deficit = deficit.saturating_sub(freed);
        report.freed += freed;
        debug!("Evicted '{}' ({} bytes), {} bytes still needed", victim, freed, deficit);
        report.evicted.push(victim);
    }

    Ok(report)
}
