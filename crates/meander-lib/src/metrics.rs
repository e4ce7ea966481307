//! Accuracy metrics between a predicted and an observed centerline

use crate::{DistanceMatcher, Result, utils};
use geo::Point;

/// Root-mean-square error between positionally paired points
///
/// The i-th point of `predicted` is paired with the i-th point of `observed`
/// for every index both sequences have; extra points in the longer sequence
/// are ignored. Unlike the migration matcher this metric depends on vertex
/// order. Returns `0.0` when either sequence is empty.
pub fn rmse(predicted: &[Point<f64>], observed: &[Point<f64>]) -> f64 {
    let n = predicted.len().min(observed.len());
    if n == 0 {
        return 0.0;
    }

    let sum_squared: f64 = predicted
        .iter()
        .zip(observed)
        .map(|(p, o)| utils::distance_squared(*p, *o))
        .sum();

    (sum_squared / n as f64).sqrt()
}

/// Directed Hausdorff-style separation from `from` to `to`
///
/// The largest nearest-neighbor distance from any point of `from` to the
/// point set `to`, clamped to `cutoff`. Only this one direction is measured;
/// the symmetric Hausdorff distance would also take the maximum of the
/// reverse direction.
///
/// Returns `0.0` when `from` is empty, and
/// [`MigrationError::EmptyReferenceSet`](crate::MigrationError::EmptyReferenceSet)
/// when `from` has points but `to` has none.
pub fn max_separation(
    from: &[Point<f64>],
    to: &[Point<f64>],
    cutoff: f64,
    matcher: &dyn DistanceMatcher,
) -> Result<f64> {
    let distances = matcher.nearest_distances(from, to)?;
    let max = distances.into_iter().fold(0.0, f64::max);
    Ok(max.min(cutoff))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BruteForceMatcher, MigrationError, RTreeMatcher};

    fn points(coords: &[(f64, f64)]) -> Vec<Point<f64>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_rmse_of_identical_sequences_is_zero() {
        let line = points(&[(0.0, 0.0), (3.0, 1.0), (7.0, -2.0)]);
        assert_eq!(rmse(&line, &line), 0.0);
    }

    #[test]
    fn test_rmse_constant_offset() {
        let predicted = points(&[(0.0, 3.0), (10.0, 3.0)]);
        let observed = points(&[(0.0, 0.0), (10.0, 0.0)]);
        assert!((rmse(&predicted, &observed) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rmse_truncates_to_shorter_sequence() {
        let predicted = points(&[(0.0, 1.0), (1.0, 1.0), (500.0, 500.0)]);
        let observed = points(&[(0.0, 0.0), (1.0, 0.0)]);
        assert!((rmse(&predicted, &observed) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rmse_is_positional() {
        // Same point sets in reverse order: nearest-neighbor would be zero
        let forward = points(&[(0.0, 0.0), (10.0, 0.0)]);
        let reverse = points(&[(10.0, 0.0), (0.0, 0.0)]);
        assert!((rmse(&forward, &reverse) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_rmse_mixed_errors() {
        // Squared errors 9 and 16, mean 12.5
        let predicted = points(&[(3.0, 0.0), (0.0, 4.0)]);
        let observed = points(&[(0.0, 0.0), (0.0, 0.0)]);
        assert!((rmse(&predicted, &observed) - 12.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_rmse_empty_is_zero() {
        let line = points(&[(1.0, 1.0)]);
        assert_eq!(rmse(&[], &line), 0.0);
        assert_eq!(rmse(&line, &[]), 0.0);
        assert_eq!(rmse(&[], &[]), 0.0);
    }

    #[test]
    fn test_max_separation_of_identical_sets_is_zero() {
        let line = points(&[(0.0, 0.0), (5.0, 2.0), (10.0, 0.0)]);
        let separation = max_separation(&line, &line, 1000.0, &BruteForceMatcher).unwrap();
        assert_eq!(separation, 0.0);
    }

    #[test]
    fn test_max_separation_takes_the_worst_point() {
        let from = points(&[(0.0, 1.0), (5.0, 4.0), (10.0, 2.0)]);
        let to = points(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]);
        let separation = max_separation(&from, &to, 1000.0, &BruteForceMatcher).unwrap();
        assert!((separation - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_separation_is_directed() {
        let short = points(&[(0.0, 0.0)]);
        let long = points(&[(0.0, 0.0), (100.0, 0.0)]);

        let forward = max_separation(&short, &long, 1000.0, &BruteForceMatcher).unwrap();
        let backward = max_separation(&long, &short, 1000.0, &BruteForceMatcher).unwrap();
        assert_eq!(forward, 0.0);
        assert!((backward - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_separation_clamped_to_cutoff() {
        let from = points(&[(0.0, 5000.0)]);
        let to = points(&[(0.0, 0.0)]);
        let matcher = RTreeMatcher;
        let separation = max_separation(&from, &to, 1000.0, &matcher).unwrap();
        assert_eq!(separation, 1000.0);
    }

    #[test]
    fn test_max_separation_empty_sets() {
        let line = points(&[(0.0, 0.0)]);
        assert_eq!(
            max_separation(&[], &line, 1000.0, &BruteForceMatcher).unwrap(),
            0.0
        );
        assert!(matches!(
            max_separation(&line, &[], 1000.0, &BruteForceMatcher),
            Err(MigrationError::EmptyReferenceSet)
        ));
    }
}
