//! Centerline geometry storage and flattening
//!
//! This module provides the [`Centerline`] enum, the typed representation of a
//! channel planform at one point in time, and [`TimeSeriesEntry`], which pairs a
//! centerline with the period it was captured in.

use crate::{MigrationError, Result, utils::LocalProjection};
use geo::{Centroid, LineString, MultiLineString, Point};
use rayon::prelude::*;
use std::path::Path;

/// A river centerline at one point in time, in planar coordinates (meters)
///
/// The variant records the geometry type explicitly, so callers never need to
/// inspect the coordinates to know whether they hold one part or many.
/// An empty geometry is a valid, degenerate centerline.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Centerline {
    /// A single connected polyline
    Line(LineString<f64>),
    /// A collection of polylines sharing one coordinate reference system
    MultiLine(MultiLineString<f64>),
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Centerline {
    /// Create a single-part centerline, rejecting non-finite coordinates
    pub fn line(line: LineString<f64>) -> Result<Self> {
        let centerline = Self::Line(line);
        centerline.validate()?;
        Ok(centerline)
    }

    /// Create a multi-part centerline, rejecting non-finite coordinates
    pub fn multi_line(lines: MultiLineString<f64>) -> Result<Self> {
        let centerline = Self::MultiLine(lines);
        centerline.validate()?;
        Ok(centerline)
    }

    /// An empty centerline (no parts, no points)
    pub fn empty() -> Self {
        Self::MultiLine(MultiLineString::new(Vec::new()))
    }

    /// Check that every coordinate is finite
    ///
    /// Constructors call this already; it is public for values built directly
    /// from the enum variants or deserialized from external input.
    pub fn validate(&self) -> Result<()> {
        for (part_index, line) in self.parts().enumerate() {
            for (vertex_index, coord) in line.coords().enumerate() {
                if !coord.x.is_finite() || !coord.y.is_finite() {
                    return Err(MigrationError::InvalidGeometry(format!(
                        "non-finite coordinate ({}, {}) at part {}, vertex {}",
                        coord.x, coord.y, part_index, vertex_index
                    )));
                }
            }
        }
        Ok(())
    }

    /// Iterate over the constituent polylines in input order
    pub fn parts(&self) -> std::slice::Iter<'_, LineString<f64>> {
        match self {
            Centerline::Line(line) => std::slice::from_ref(line).iter(),
            Centerline::MultiLine(lines) => lines.0.iter(),
        }
    }

    /// Number of constituent polylines
    #[inline]
    pub fn part_count(&self) -> usize {
        match self {
            Centerline::Line(_) => 1,
            Centerline::MultiLine(lines) => lines.0.len(),
        }
    }

    /// Total number of vertices across all parts
    #[inline]
    pub fn point_count(&self) -> usize {
        self.parts().map(|line| line.0.len()).sum()
    }

    /// Check if the centerline holds no vertices at all
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }

    /// Flatten all parts into one ordered point sequence
    ///
    /// Vertices are concatenated part by part, keeping vertex order inside each
    /// part. A single-part centerline flattens to its own vertex list, and an
    /// empty centerline flattens to an empty vector.
    pub fn flatten(&self) -> Vec<Point<f64>> {
        let mut points = Vec::with_capacity(self.point_count());
        for line in self.parts() {
            points.extend(line.points());
        }
        points
    }

    /// Length-weighted centroid of the centerline, `None` when empty
    pub fn centroid(&self) -> Option<Point<f64>> {
        match self {
            Centerline::Line(line) => line.centroid(),
            Centerline::MultiLine(lines) => lines.centroid(),
        }
    }

    /// Build a centerline from GPX tracks, projected to meters with `projection`
    ///
    /// Every track segment becomes one polyline. Fixes that are not valid
    /// latitude/longitude pairs are skipped, and segments left without points
    /// are dropped. A GPX document without usable points yields an empty
    /// centerline.
    pub fn from_gpx(gpx_data: &gpx::Gpx, projection: &LocalProjection) -> Result<Self> {
        let mut parts: Vec<LineString<f64>> = Vec::new();

        for track in &gpx_data.tracks {
            for segment in &track.segments {
                let mut coords = Vec::with_capacity(segment.points.len());

                for waypoint in &segment.points {
                    match projection.project_waypoint(waypoint) {
                        Some(point) => coords.push(point.0),
                        None => tracing::warn!(
                            "Skipping invalid GPS fix: ({}, {})",
                            waypoint.point().y(),
                            waypoint.point().x()
                        ),
                    }
                }

                if !coords.is_empty() {
                    parts.push(LineString::new(coords));
                }
            }
        }

        if parts.is_empty() {
            tracing::warn!("GPX data contains no usable track points, centerline is empty");
        }

        if parts.len() == 1 {
            Self::line(parts.remove(0))
        } else {
            Self::multi_line(MultiLineString::new(parts))
        }
    }

    /// Read and project a GPX file
    pub fn from_gpx_file<P: AsRef<Path>>(path: P, projection: &LocalProjection) -> Result<Self> {
        Self::from_gpx(&read_gpx(path)?, projection)
    }
}

/// Parse a GPX file
pub fn read_gpx<P: AsRef<Path>>(path: P) -> Result<gpx::Gpx> {
    let file = std::fs::File::open(path.as_ref())?;
    Ok(gpx::read(std::io::BufReader::new(file))?)
}

/// A centerline captured for one analysis period
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSeriesEntry {
    /// Period identifier, e.g. "1995"
    pub label: String,
    /// Decimal year of the capture, used to derive intervals between periods
    pub year: f64,
    /// The channel planform for this period
    pub centerline: Centerline,
}

impl TimeSeriesEntry {
    /// Create a new entry
    pub fn new(label: impl Into<String>, year: f64, centerline: Centerline) -> Self {
        Self {
            label: label.into(),
            year,
            centerline,
        }
    }

    /// Load one entry per GPX file in parallel
    ///
    /// Each tuple is `(label, year, path)`. The returned entries keep the input
    /// order; the first file that fails to load aborts the whole batch.
    ///
    /// All periods share one [`LocalProjection`], centered on the first period
    /// that holds any valid fix, so distances between periods are in ground meters.
    pub fn load_gpx_files<P: AsRef<Path> + Send + Sync>(
        periods: Vec<(String, f64, P)>,
    ) -> Result<Vec<Self>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("centerline::load_gpx_files");

        let documents: Vec<(String, f64, gpx::Gpx)> = periods
            .into_par_iter()
            .map(|(label, year, path)| {
                let gpx_data = read_gpx(path.as_ref())?;
                tracing::debug!("Read period {} from {}", label, path.as_ref().display());
                Ok((label, year, gpx_data))
            })
            .collect::<Result<_>>()?;

        let projection = documents
            .iter()
            .find_map(|(_, _, gpx_data)| LocalProjection::centered_on(gpx_data))
            .unwrap_or_else(|| {
                tracing::warn!("No valid GPS fix in any period, projecting about (0, 0)");
                LocalProjection::new(0.0, 0.0)
            });
        let (origin_lat, origin_lon) = projection.origin();
        tracing::info!(
            "Projecting {} periods about ({:.6}, {:.6})",
            documents.len(),
            origin_lat,
            origin_lon
        );

        documents
            .into_par_iter()
            .map(|(label, year, gpx_data)| {
                let centerline = Centerline::from_gpx(&gpx_data, &projection)?;
                tracing::debug!(
                    "Period {}: {} parts, {} points",
                    label,
                    centerline.part_count(),
                    centerline.point_count()
                );
                Ok(Self::new(label, year, centerline))
            })
            .collect()
    }
}
