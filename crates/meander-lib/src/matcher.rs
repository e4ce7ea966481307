//! Nearest-neighbor distance matching between point sequences
//!
//! For every point of a source sequence, a [`DistanceMatcher`] returns the
//! minimum Euclidean distance to any point of a target sequence. This is a
//! nearest-neighbor approximation of point correspondence, not a true
//! along-curve correspondence.
//!
//! Two strategies are provided and must agree exactly:
//! - [`BruteForceMatcher`] scans every target point for every source point.
//! - [`RTreeMatcher`] bulk-loads the target into an R*-tree first.

use crate::{MigrationError, Result, utils};
use geo::Point;
use rstar::RTree;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Strategy for computing nearest-neighbor distances
///
/// Implementations must return the same distances for the same input; they
/// may only differ in performance.
pub trait DistanceMatcher: Send + Sync {
    /// For each point in `source`, the distance to its nearest point in `target`
    ///
    /// Returns an empty vector when `source` is empty (whatever `target` is),
    /// and [`MigrationError::EmptyReferenceSet`] when `source` has points but
    /// `target` has none.
    fn nearest_distances(&self, source: &[Point<f64>], target: &[Point<f64>])
    -> Result<Vec<f64>>;
}

/// Selects a [`DistanceMatcher`] implementation from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum MatcherKind {
    /// O(N×M) exhaustive scan
    #[default]
    BruteForce,
    /// R*-tree over the target set
    #[cfg_attr(feature = "serde", serde(rename = "rtree"))]
    RTree,
}

impl MatcherKind {
    /// Instantiate the matcher
    pub fn build(self) -> Box<dyn DistanceMatcher> {
        match self {
            MatcherKind::BruteForce => Box::new(BruteForceMatcher),
            MatcherKind::RTree => Box::new(RTreeMatcher),
        }
    }
}

/// Exhaustive nearest-neighbor scan
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceMatcher;

/// Nearest-neighbor search over an [`RTree`] bulk-loaded from the target
#[derive(Debug, Clone, Copy, Default)]
pub struct RTreeMatcher;

/// Shared empty-set contract: `Ok(false)` means "nothing to match"
fn check_sets(source: &[Point<f64>], target: &[Point<f64>]) -> Result<bool> {
    if source.is_empty() {
        return Ok(false);
    }
    if target.is_empty() {
        return Err(MigrationError::EmptyReferenceSet);
    }
    Ok(true)
}

/// Distance from one point to the closest point of a non-empty target
#[inline]
fn nearest_distance_brute_force(point: Point<f64>, target: &[Point<f64>]) -> f64 {
    target
        .iter()
        .map(|candidate| utils::distance(point, *candidate))
        .fold(f64::INFINITY, f64::min)
}

impl DistanceMatcher for BruteForceMatcher {
    fn nearest_distances(
        &self,
        source: &[Point<f64>],
        target: &[Point<f64>],
    ) -> Result<Vec<f64>> {
        if !check_sets(source, target)? {
            return Ok(Vec::new());
        }

        Ok(source
            .iter()
            .map(|point| nearest_distance_brute_force(*point, target))
            .collect())
    }
}

impl DistanceMatcher for RTreeMatcher {
    fn nearest_distances(
        &self,
        source: &[Point<f64>],
        target: &[Point<f64>],
    ) -> Result<Vec<f64>> {
        if !check_sets(source, target)? {
            return Ok(Vec::new());
        }

        let tree: RTree<[f64; 2]> = RTree::bulk_load(target.iter().map(|p| [p.x(), p.y()]).collect());
        source
            .iter()
            .map(|point| {
                // Distance recomputed with the brute-force formula so both strategies round alike
                tree.nearest_neighbor(&[point.x(), point.y()])
                    .map(|nearest| utils::distance(*point, Point::new(nearest[0], nearest[1])))
                    .ok_or(MigrationError::EmptyReferenceSet)
            })
            .collect()
    }
}
