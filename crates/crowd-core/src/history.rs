//! Bounded occupancy history.
//!
//! Each record keeps at most [`HISTORY_CAPACITY`] samples. Appending past
//! capacity evicts from the front, so the oldest sample goes first.

use crowd_types::LocationRecord;

/// Maximum number of samples retained per location.
pub const HISTORY_CAPACITY: usize = 20;

/// Append the record's current occupancy to its history.
///
/// Returns the history after the append and any eviction. Only the given
/// record is touched.
pub fn add_sample(record: &mut LocationRecord) -> &[u32] {
    let current = record.occupancy();
    record.history.push(current);
    if record.history.len() > HISTORY_CAPACITY {
        let excess = record.history.len().saturating_sub(HISTORY_CAPACITY);
        record.history.drain(..excess);
    }
    &record.history
}
