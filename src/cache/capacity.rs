//! Capacity Bookkeeping
//!
//! Occupied space is always recomputed from the store; no running total is
//! kept, so it cannot drift from what is actually stored. The recency ledger
//! is bookkeeping, not cached data, and is left out of the total.

use crate::cache::{bytes, LEDGER_KEY};
use crate::error::Result;
use crate::store::Backend;

// == Used Bytes ==
/// Sums the byte length of every key and value in the store except the
/// recency ledger.
pub fn used_bytes<B: Backend + ?Sized>(backend: &B) -> Result<usize> {
    let mut total = 0;
    for key in backend.keys().into_iter().filter(|k| k != LEDGER_KEY) {
        total += bytes::estimate(&key)?;
        if let Some(value) = backend.get_item(&key) {
            total += bytes::estimate(&value)?;
        }
    }
    Ok(total)
}

// == Left ==
/// Remaining space under `capacity`. Negative when the store holds more than
/// the soft capacity, which only happens transiently or when data was written
/// behind the cache's back.
pub fn left(capacity: usize, used: usize) -> i64 {
    capacity as i64 - used as i64
}
