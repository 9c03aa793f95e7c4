//! Byte-Length Estimator
//!
//! Computes the storage footprint of a string with UTF-8-style
//! variable-width accounting.

use crate::error::{CacheError, Result};

/// Upper bounds (exclusive) of each width class, narrowest first.
const WIDTH_BOUNDS: [u32; 6] = [1 << 7, 1 << 11, 1 << 16, 1 << 21, 1 << 26, 1 << 31];

// == Width ==
/// Returns how many bytes a single code unit occupies, or `None` when it lies
/// outside every width class.
pub fn width(code: u32) -> Option<usize> {
    WIDTH_BOUNDS
        .iter()
        .position(|&bound| code < bound)
        .map(|class| class + 1)
}

// == Estimate ==
/// Sums the widths of a sequence of code units.
///
/// Returns `Err` carrying the first code unit with an unknown width.
pub fn estimate_code_points<I>(units: I) -> std::result::Result<usize, u32>
where
    I: IntoIterator<Item = u32>,
{
    units
        .into_iter()
        .try_fold(0usize, |total, code| width(code).map(|w| total + w).ok_or(code))
}

/// Estimates the stored size of `value` in bytes.
pub fn estimate(value: &str) -> Result<usize> {
    estimate_code_points(value.chars().map(u32::from)).map_err(CacheError::UnknownByteWidth)
}

/// Estimates the footprint of a key/value pair.
pub fn pair_size(key: &str, value: &str) -> Result<usize> {
    Ok(estimate(key)? + estimate(value)?)
}
