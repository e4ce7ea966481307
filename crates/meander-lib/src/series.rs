//! MigrationAnalysis - Time-series driver for centerline comparisons
//!
//! This module provides the high-level API: it takes the ordered per-period
//! centerlines, computes a migration rate for every consecutive pair, and
//! compares every later period against the earliest one (the reference).
//!
//! Failures are isolated per pair: a comparison that cannot be computed is
//! recorded as a [`PairFailure`] and the remaining pairs still run.

use crate::{
    DistanceMatcher, MatcherKind, MigrationError, Result, TimeSeriesEntry, max_separation,
    mean_distance, migration_rate, rmse, utils,
};

use geo::Point;
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a migration analysis
///
/// Replaces the study-wide constants of an extraction run (time step, search
/// tolerance) with an explicit value handed to [`MigrationAnalysis::new`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Fixed time interval between consecutive periods, in years.
    /// When `None`, each pair uses the difference between the entries' years.
    pub interval_years: Option<f64>,
    /// Maximum separation values are clamped to this distance in meters.
    /// Default: 1000.0
    pub max_separation_cutoff: f64,
    /// Nearest-neighbor strategy used for migration and separation
    pub matcher: MatcherKind,
    /// Compare period pairs on the rayon thread pool
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_years: None,
            max_separation_cutoff: 1000.0,
            matcher: MatcherKind::default(),
            parallel: true,
        }
    }
}

impl Config {
    /// Reject settings that can never produce a meaningful result
    pub fn validate(&self) -> Result<()> {
        if let Some(interval) = self.interval_years
            && (interval.is_nan() || interval <= 0.0)
        {
            return Err(MigrationError::InvalidConfig(format!(
                "fixed interval must be strictly positive, got {interval}"
            )));
        }
        if self.max_separation_cutoff.is_nan() || self.max_separation_cutoff <= 0.0 {
            return Err(MigrationError::InvalidConfig(format!(
                "max separation cutoff must be strictly positive, got {}",
                self.max_separation_cutoff
            )));
        }
        Ok(())
    }
}

/// Progress of a [`MigrationAnalysis`]
///
/// Stages only move forward: `Init → ComputeMigration → ComputeAccuracy → Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Stage {
    /// Inputs validated and flattened, nothing computed yet
    Init,
    /// Migration rates computed for every consecutive pair
    ComputeMigration,
    /// Accuracy metrics computed for every period after the reference
    ComputeAccuracy,
    /// Report ready
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "INIT",
            Stage::ComputeMigration => "COMPUTE_MIGRATION",
            Stage::ComputeAccuracy => "COMPUTE_ACCURACY",
            Stage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Migration between two consecutive periods
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MigrationResult {
    /// Earlier period
    pub from_period: String,
    /// Later period
    pub to_period: String,
    /// Time between the two periods in years
    pub interval_years: f64,
    /// Mean nearest-neighbor distance from the earlier to the later centerline (meters)
    pub mean_distance: f64,
    /// Average migration rate in meters per year
    pub rate: f64,
    /// Distance between the two centerline centroids (meters), `None` if either is empty
    pub centroid_shift: Option<f64>,
}

/// Accuracy of one period's centerline against the reference centerline
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AccuracyResult {
    /// Compared period
    pub period: String,
    /// Positional RMSE against the reference (meters)
    pub rmse: f64,
    /// Directed maximum separation from the reference (meters, clamped to the cutoff)
    pub max_separation: f64,
}

/// A comparison between two periods that could not be computed
#[derive(Debug, thiserror::Error)]
#[error("{from_period} -> {to_period}: {error}")]
pub struct PairFailure {
    /// Earlier (or reference) period
    pub from_period: String,
    /// Later (or compared) period
    pub to_period: String,
    /// Why the comparison failed
    #[source]
    pub error: MigrationError,
}

impl PairFailure {
    fn new(from_period: &str, to_period: &str, error: MigrationError) -> Self {
        Self {
            from_period: from_period.to_string(),
            to_period: to_period.to_string(),
            error,
        }
    }
}

/// Results of a completed analysis
///
/// Both collections hold one entry per period after the first, in period order.
#[derive(Debug)]
pub struct TimeSeriesReport {
    /// Migration between period `i` and period `i + 1`
    pub migration: Vec<std::result::Result<MigrationResult, PairFailure>>,
    /// Accuracy of period `i + 1` against period 0
    pub accuracy: Vec<std::result::Result<AccuracyResult, PairFailure>>,
}

impl TimeSeriesReport {
    /// Mean of the successfully computed migration rates, `None` if there are none
    pub fn mean_migration_rate(&self) -> Option<f64> {
        let rates: Vec<f64> = self
            .migration
            .iter()
            .filter_map(|outcome| outcome.as_ref().ok().map(|m| m.rate))
            .collect();

        if rates.is_empty() {
            None
        } else {
            Some(mean_distance(&rates))
        }
    }

    /// All failed comparisons, migration first, then accuracy
    pub fn failures(&self) -> impl Iterator<Item = &PairFailure> {
        self.migration
            .iter()
            .filter_map(|outcome| outcome.as_ref().err())
            .chain(
                self.accuracy
                    .iter()
                    .filter_map(|outcome| outcome.as_ref().err()),
            )
    }

    /// Check if every comparison succeeded
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Read-only view shared by the per-pair workers
struct Comparator<'a> {
    config: &'a Config,
    entries: &'a [TimeSeriesEntry],
    points: &'a [Vec<Point<f64>>],
    matcher: &'a dyn DistanceMatcher,
}

impl Comparator<'_> {
    /// Number of comparisons of each kind
    fn pair_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Run `compare` for every pair index, in parallel if configured, keeping index order
    fn map_pairs<T, F>(&self, compare: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&Self, usize) -> T + Send + Sync,
    {
        if self.config.parallel {
            (0..self.pair_count())
                .into_par_iter()
                .map(|index| compare(self, index))
                .collect()
        } else {
            (0..self.pair_count())
                .map(|index| compare(self, index))
                .collect()
        }
    }

    /// Migration from period `index` to period `index + 1`
    fn migration(&self, index: usize) -> std::result::Result<MigrationResult, PairFailure> {
        let earlier = &self.entries[index];
        let later = &self.entries[index + 1];

        let interval_years = self
            .config
            .interval_years
            .unwrap_or(later.year - earlier.year);

        let distances = self
            .matcher
            .nearest_distances(&self.points[index], &self.points[index + 1])
            .map_err(|error| PairFailure::new(&earlier.label, &later.label, error))?;

        let rate = migration_rate(&distances, interval_years)
            .map_err(|error| PairFailure::new(&earlier.label, &later.label, error))?;

        let centroid_shift = match (earlier.centerline.centroid(), later.centerline.centroid()) {
            (Some(a), Some(b)) => Some(utils::distance(a, b)),
            _ => None,
        };

        tracing::debug!(
            "Migration {} -> {}: {} matched points, rate {:.4} m/yr over {} years",
            earlier.label,
            later.label,
            distances.len(),
            rate,
            interval_years
        );

        Ok(MigrationResult {
            from_period: earlier.label.clone(),
            to_period: later.label.clone(),
            interval_years,
            mean_distance: mean_distance(&distances),
            rate,
            centroid_shift,
        })
    }

    /// Accuracy of period `index + 1` against the reference period 0
    fn accuracy(&self, index: usize) -> std::result::Result<AccuracyResult, PairFailure> {
        let reference = &self.entries[0];
        let compared = &self.entries[index + 1];

        let observed = &self.points[0];
        let predicted = &self.points[index + 1];

        let rmse = rmse(predicted, observed);
        let max_separation = max_separation(
            observed,
            predicted,
            self.config.max_separation_cutoff,
            self.matcher,
        )
        .map_err(|error| PairFailure::new(&reference.label, &compared.label, error))?;

        tracing::debug!(
            "Accuracy {} vs {}: rmse {:.4} m, max separation {:.4} m",
            compared.label,
            reference.label,
            rmse,
            max_separation
        );

        Ok(AccuracyResult {
            period: compared.label.clone(),
            rmse,
            max_separation,
        })
    }
}

/// Drives the comparison of an ordered list of periods
///
/// ```rust
/// use meander_lib::{Centerline, Config, MigrationAnalysis, Stage, TimeSeriesEntry};
///
/// # fn main() -> meander_lib::Result<()> {
/// let entries = vec![
///     TimeSeriesEntry::new("1995", 1995.0, Centerline::empty()),
///     TimeSeriesEntry::new("2005", 2005.0, Centerline::empty()),
/// ];
/// let mut analysis = MigrationAnalysis::new(Config::default(), entries)?;
/// assert_eq!(analysis.advance(), Stage::ComputeMigration);
/// let report = analysis.run();
/// assert_eq!(report.migration.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct MigrationAnalysis {
    /// Configuration settings
    config: Config,
    /// Ordered periods (owned for the whole run, never mutated)
    entries: Vec<TimeSeriesEntry>,
    /// Flattened centerline of every period, same order as `entries`
    points: Vec<Vec<Point<f64>>>,
    /// Nearest-neighbor strategy built from the configuration
    matcher: Box<dyn DistanceMatcher>,
    /// Current stage
    stage: Stage,
    /// Migration outcomes (filled by the COMPUTE_MIGRATION stage)
    migration: Vec<std::result::Result<MigrationResult, PairFailure>>,
    /// Accuracy outcomes (filled by the COMPUTE_ACCURACY stage)
    accuracy: Vec<std::result::Result<AccuracyResult, PairFailure>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl MigrationAnalysis {
    /// Validate the configuration and inputs, and flatten every centerline
    ///
    /// Fails with [`MigrationError::InsufficientPeriods`] when fewer than two
    /// periods are supplied, since nothing can be compared.
    pub fn new(config: Config, entries: Vec<TimeSeriesEntry>) -> Result<Self> {
        #[cfg(feature = "profiling")]
        profiling::scope!("analysis::new");

        config.validate()?;

        if entries.len() < 2 {
            return Err(MigrationError::InsufficientPeriods {
                found: entries.len(),
            });
        }

        for entry in &entries {
            entry.centerline.validate()?;
        }

        let points: Vec<Vec<Point<f64>>> = entries
            .iter()
            .map(|entry| entry.centerline.flatten())
            .collect();
        let matcher = config.matcher.build();

        tracing::debug!(
            "Analysis initialized with {} periods ({} total points), matcher {:?}",
            entries.len(),
            points.iter().map(Vec::len).sum::<usize>(),
            config.matcher
        );

        Ok(Self {
            config,
            entries,
            points,
            matcher,
            stage: Stage::Init,
            migration: Vec::new(),
            accuracy: Vec::new(),
        })
    }

    /// Current stage
    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Perform the next stage and return the stage entered
    ///
    /// Calling this once the analysis is `Done` does nothing.
    pub fn advance(&mut self) -> Stage {
        let comparator = Comparator {
            config: &self.config,
            entries: &self.entries,
            points: &self.points,
            matcher: self.matcher.as_ref(),
        };

        let next = match self.stage {
            Stage::Init => {
                #[cfg(feature = "profiling")]
                profiling::scope!("analysis::compute_migration");
                self.migration = comparator.map_pairs(Comparator::migration);
                Stage::ComputeMigration
            }
            Stage::ComputeMigration => {
                #[cfg(feature = "profiling")]
                profiling::scope!("analysis::compute_accuracy");
                self.accuracy = comparator.map_pairs(Comparator::accuracy);
                Stage::ComputeAccuracy
            }
            Stage::ComputeAccuracy | Stage::Done => Stage::Done,
        };

        if next != self.stage {
            tracing::debug!("Analysis stage {} -> {}", self.stage, next);
            self.stage = next;
        }
        self.stage
    }

    /// Run all remaining stages and return the report
    pub fn run(mut self) -> TimeSeriesReport {
        while self.advance() != Stage::Done {}

        let report = TimeSeriesReport {
            migration: self.migration,
            accuracy: self.accuracy,
        };

        for failure in report.failures() {
            tracing::warn!("Comparison failed: {}", failure);
        }
        tracing::info!(
            "Analysis done: {} periods, {} migration intervals, {} failed comparisons",
            self.entries.len(),
            report.migration.len(),
            report.failures().count()
        );

        report
    }
}
