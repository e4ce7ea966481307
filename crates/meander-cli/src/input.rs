//! Loading the time series from GPX periods or a JSON series file

use crate::{CliError, settings::Settings};
use meander_lib::TimeSeriesEntry;
use serde::Deserialize;
use std::io::Read;

/// On-disk JSON time series
///
/// ```json
/// { "periods": [
///     { "label": "1995", "year": 1995.0,
///       "centerline": { "Line": [ { "x": 0.0, "y": 0.0 }, { "x": 10.0, "y": 0.0 } ] } }
/// ] }
/// ```
#[derive(Debug, Deserialize)]
pub struct SeriesFile {
    pub periods: Vec<TimeSeriesEntry>,
}

/// Parse a JSON series from any reader
pub fn parse_series<R: Read>(reader: R) -> Result<Vec<TimeSeriesEntry>, CliError> {
    let series: SeriesFile = serde_json::from_reader(reader)?;
    Ok(series.periods)
}

/// Load the periods selected by the settings, in the order given
pub fn load_entries(settings: &Settings) -> Result<Vec<TimeSeriesEntry>, CliError> {
    if let Some(path) = &settings.series {
        tracing::info!("Loading time series from {}", path.display());
        let file = std::fs::File::open(path)?;
        return parse_series(std::io::BufReader::new(file));
    }

    if settings.periods.is_empty() {
        return Err(CliError::NoInput);
    }

    tracing::info!("Loading {} GPX periods", settings.periods.len());
    let periods = settings
        .periods
        .iter()
        .map(|period| (period.label.clone(), period.year, period.path.clone()))
        .collect();

    Ok(TimeSeriesEntry::load_gpx_files(periods)?)
}
