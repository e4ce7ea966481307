//! Meander Library - Planform Comparison Engine for River Centerlines
//!
//! This library turns a time-ordered sequence of river centerlines into migration and accuracy
//! metrics. Centerlines are produced elsewhere (image classification and skeletonization are not
//! part of this crate) and arrive here as planar line geometries in meters.
//!
//! # Architecture
//!
//! - **[`Centerline`]**: Single or multi-part line geometry, flattened into an ordered point list
//! - **[`DistanceMatcher`]**: Nearest-neighbor distances from one point set to another, with a
//!   brute-force and an R*-tree ([`rstar`]) strategy that return identical results
//! - **[`migration_rate`]**: Mean matched distance divided by the time interval
//! - **[`rmse`] / [`max_separation`]**: Positional RMSE and directed Hausdorff-style separation
//! - **[`MigrationAnalysis`]**: Drives the above across consecutive periods and against the
//!   earliest (reference) period
//!
//! # Example
//!
//! ```rust
//! use geo::{LineString, coord};
//! use meander_lib::{Centerline, Config, MigrationAnalysis, TimeSeriesEntry};
//!
//! # fn main() -> meander_lib::Result<()> {
//! let line = |y: f64| {
//!     Centerline::line(LineString::new(vec![
//!         coord! { x: 0.0, y: y },
//!         coord! { x: 10.0, y: y },
//!     ]))
//! };
//!
//! let entries = vec![
//!     TimeSeriesEntry::new("1995", 1995.0, line(0.0)?),
//!     TimeSeriesEntry::new("2005", 2005.0, line(1.0)?),
//! ];
//!
//! let report = MigrationAnalysis::new(Config::default(), entries)?.run();
//! let rate = report.migration[0].as_ref().map(|m| m.rate).unwrap_or_default();
//! assert!((rate - 0.1).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```
//!
//! # Performance Characteristics
//!
//! - **Brute force**: O(N×M) per comparison
//! - **R-tree**: O(M log M) bulk load + roughly O(N log M) queries
//! - **Series**: period pairs are independent and run on the rayon pool when enabled

mod centerline;
mod matcher;
mod metrics;
mod migration;
mod series;
pub mod utils;

// Public API exports
pub use centerline::{Centerline, TimeSeriesEntry, read_gpx};
pub use matcher::{BruteForceMatcher, DistanceMatcher, MatcherKind, RTreeMatcher};
pub use metrics::{max_separation, rmse};
pub use migration::{mean_distance, migration_rate};
pub use series::{
    AccuracyResult, Config, MigrationAnalysis, MigrationResult, PairFailure, Stage,
    TimeSeriesReport,
};

/// Error types for the comparison engine
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Nearest-neighbor distance requested against an empty reference set")]
    EmptyReferenceSet,

    #[error("Invalid time interval {0}: must be strictly positive")]
    InvalidInterval(f64),

    #[error("At least 2 periods are required for comparison, found {found}")]
    InsufficientPeriods { found: usize },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that the main entry points are accessible
        let _: fn() -> Config = Config::default;
        let _: fn(&[f64], f64) -> Result<f64> = migration_rate;
        let _: fn(&[geo::Point<f64>], &[geo::Point<f64>]) -> f64 = rmse;
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            MigrationError::InvalidInterval(-1.0).to_string(),
            "Invalid time interval -1: must be strictly positive"
        );
        assert_eq!(
            MigrationError::InsufficientPeriods { found: 1 }.to_string(),
            "At least 2 periods are required for comparison, found 1"
        );
    }
}
