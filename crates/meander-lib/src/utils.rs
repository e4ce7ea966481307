//! Planar helpers: projection of GPS fixes and Euclidean distances

use geo::Point;

/// WGS84 semi-major axis in meters
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Check that a fix is a usable WGS84 latitude/longitude pair
#[inline]
fn is_valid_fix(lat: f64, lon: f64) -> bool {
    lat.is_finite() && lon.is_finite() && lat.abs() <= 90.0 && lon.abs() <= 180.0
}

/// Equirectangular projection about a fixed origin
///
/// Maps WGS84 degrees to meters east and north of the origin:
/// `x = R·Δλ·cos φ₀`, `y = R·Δφ`. North-south distances are true everywhere,
/// east-west distances are true at the origin latitude, which keeps a river
/// reach of a few tens of kilometers within a fraction of a percent of ground
/// distance. Every period of a series must share one projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    origin_lat: f64,
    origin_lon: f64,
    cos_origin_lat: f64,
}

impl LocalProjection {
    /// Projection centered on `(origin_lat, origin_lon)` in degrees
    pub fn new(origin_lat: f64, origin_lon: f64) -> Self {
        Self {
            origin_lat,
            origin_lon,
            cos_origin_lat: origin_lat.to_radians().cos(),
        }
    }

    /// Projection centered on the mean of the valid track fixes of a GPX document
    ///
    /// `None` when the document holds no valid fix.
    pub fn centered_on(gpx_data: &gpx::Gpx) -> Option<Self> {
        let (mut lat_sum, mut lon_sum, mut count) = (0.0, 0.0, 0usize);
        for waypoint in gpx_data
            .tracks
            .iter()
            .flat_map(|track| &track.segments)
            .flat_map(|segment| &segment.points)
        {
            let fix = waypoint.point();
            if is_valid_fix(fix.y(), fix.x()) {
                lat_sum += fix.y();
                lon_sum += fix.x();
                count += 1;
            }
        }

        (count > 0).then(|| Self::new(lat_sum / count as f64, lon_sum / count as f64))
    }

    /// Origin as `(lat, lon)` in degrees
    pub fn origin(&self) -> (f64, f64) {
        (self.origin_lat, self.origin_lon)
    }

    /// Project WGS84 degrees to meters east and north of the origin
    pub fn project(&self, lat: f64, lon: f64) -> Point<f64> {
        let mut delta_lon = lon - self.origin_lon;
        if delta_lon > 180.0 {
            delta_lon -= 360.0;
        } else if delta_lon < -180.0 {
            delta_lon += 360.0;
        }

        Point::new(
            EARTH_RADIUS * delta_lon.to_radians() * self.cos_origin_lat,
            EARTH_RADIUS * (lat - self.origin_lat).to_radians(),
        )
    }

    /// Project a GPX fix, `None` when it is not a valid latitude/longitude
    pub fn project_waypoint(&self, waypoint: &gpx::Waypoint) -> Option<Point<f64>> {
        let fix = waypoint.point();
        is_valid_fix(fix.y(), fix.x()).then(|| self.project(fix.y(), fix.x()))
    }
}

/// Squared Euclidean distance between two planar points
#[inline(always)]
pub fn distance_squared(a: Point<f64>, b: Point<f64>) -> f64 {
    let dx = a.x() - b.x();
    let dy = a.y() - b.y();
    dx * dx + dy * dy
}

/// Euclidean distance between two planar points
///
/// Always the square root of [`distance_squared`], so brute force and R-tree
/// lookups round identically.
#[inline(always)]
pub fn distance(a: Point<f64>, b: Point<f64>) -> f64 {
    distance_squared(a, b).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpx::{Gpx, Track, TrackSegment, Waypoint};

    /// Degrees of latitude spanning `meters` on the ground
    fn lat_degrees(meters: f64) -> f64 {
        (meters / EARTH_RADIUS).to_degrees()
    }

    #[test]
    fn test_origin_projects_to_zero() {
        let projection = LocalProjection::new(33.0, -90.5);
        let point = projection.project(33.0, -90.5);
        assert_eq!(point, Point::new(0.0, 0.0));
        assert_eq!(projection.origin(), (33.0, -90.5));
    }

    #[test]
    fn test_north_shift_is_true_scale() {
        let projection = LocalProjection::new(33.0, -90.5);
        let a = projection.project(33.0, -90.5);
        let b = projection.project(33.0 + lat_degrees(10.0), -90.5);
        assert!((distance(a, b) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_east_shift_is_true_scale_at_origin_latitude() {
        let projection = LocalProjection::new(33.0, -90.5);
        // 10 m along the parallel at 33 degrees north
        let lon_step = (10.0 / (EARTH_RADIUS * 33.0_f64.to_radians().cos())).to_degrees();
        let a = projection.project(33.0, -90.5);
        let b = projection.project(33.0, -90.5 + lon_step);
        assert!((distance(a, b) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_antimeridian_wraps() {
        let projection = LocalProjection::new(0.0, 179.9999);
        let across = projection.project(0.0, -179.9999);
        // 0.0002 degrees of longitude at the equator, not a trip around the globe
        let expected = EARTH_RADIUS * 0.0002_f64.to_radians();
        assert!((across.x() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_project_waypoint_rejects_invalid_fixes() {
        let projection = LocalProjection::new(45.0, 10.0);
        let inside = Waypoint::new(Point::new(10.0, 45.0));
        assert!(projection.project_waypoint(&inside).is_some());

        let outside = Waypoint::new(Point::new(200.0, 45.0));
        assert!(projection.project_waypoint(&outside).is_none());

        let nan = Waypoint::new(Point::new(10.0, f64::NAN));
        assert!(projection.project_waypoint(&nan).is_none());
    }

    #[test]
    fn test_centered_on_mean_fix() {
        let mut segment = TrackSegment::default();
        segment.points.push(Waypoint::new(Point::new(-90.0, 32.0)));
        segment.points.push(Waypoint::new(Point::new(-91.0, 34.0)));
        segment.points.push(Waypoint::new(Point::new(500.0, 0.0)));
        let mut track = Track::default();
        track.segments.push(segment);
        let mut gpx = Gpx::default();
        gpx.tracks.push(track);

        let projection = LocalProjection::centered_on(&gpx).unwrap();
        let (lat, lon) = projection.origin();
        assert!((lat - 33.0).abs() < 1e-12);
        assert!((lon + 90.5).abs() < 1e-12);

        assert!(LocalProjection::centered_on(&Gpx::default()).is_none());
    }

    #[test]
    fn test_distance_pythagorean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((distance_squared(a, b) - 25.0).abs() < f64::EPSILON);
        assert!((distance(a, b) - 5.0).abs() < f64::EPSILON);
        assert!((distance(b, a) - 5.0).abs() < f64::EPSILON);
    }
}
