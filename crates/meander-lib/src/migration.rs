//! Migration rate estimation from matched distances

use crate::{MigrationError, Result};

/// Arithmetic mean of matched distances, `0.0` when there are none
#[inline]
pub fn mean_distance(distances: &[f64]) -> f64 {
    if distances.is_empty() {
        return 0.0;
    }
    distances.iter().sum::<f64>() / distances.len() as f64
}

/// Average migration rate in distance units per time unit
///
/// Returns the mean of `distances` divided by `interval`. An empty distance
/// list means no movement was observed and yields `0.0`. The interval must be
/// strictly positive: zero, negative or NaN intervals fail with
/// [`MigrationError::InvalidInterval`] before the distances are looked at.
pub fn migration_rate(distances: &[f64], interval: f64) -> Result<f64> {
    if interval.is_nan() || interval <= 0.0 {
        return Err(MigrationError::InvalidInterval(interval));
    }

    Ok(mean_distance(distances) / interval)
}
