//! Moving-average forecast.
//!
//! The forecast is the mean of the last [`PREDICTION_WINDOW`] samples,
//! rounded half-up. It is fully derived from the current history and
//! carries no state between calls.

use crowd_types::LocationRecord;

/// Number of most recent samples averaged into a forecast.
pub const PREDICTION_WINDOW: usize = 5;

/// Forecast the next occupancy sample for a record.
///
/// Returns 0 for an empty history.
pub fn predict_next(record: &LocationRecord) -> u32 {
    moving_average(&record.history)
}

/// Rounded mean of the last [`PREDICTION_WINDOW`] values of `history`.
pub fn moving_average(history: &[u32]) -> u32 {
    let start = history.len().saturating_sub(PREDICTION_WINDOW);
    let Some(window) = history.get(start..) else {
        return 0;
    };
    if window.is_empty() {
        return 0;
    }

    let sum: u64 = window.iter().map(|&v| u64::from(v)).sum();
    let count = window.len() as u64;

    // Half-up rounding in integers: floor((2 * sum + count) / (2 * count)).
    let doubled = sum.saturating_mul(2).saturating_add(count);
    let rounded = doubled.checked_div(count.saturating_mul(2)).unwrap_or(0);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
