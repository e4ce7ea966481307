//! JSON report and log summary of an analysis

use meander_lib::{AccuracyResult, MigrationResult, PairFailure, TimeSeriesReport};
use serde::Serialize;
use std::io::Write;

/// Serializable form of a [`TimeSeriesReport`]
#[derive(Debug, Serialize)]
pub struct ReportDocument {
    /// Mean of the successful migration rates (m/yr)
    pub mean_migration_rate: Option<f64>,
    /// One row per consecutive period pair
    pub migration: Vec<Outcome<MigrationResult>>,
    /// One row per period after the reference
    pub accuracy: Vec<Outcome<AccuracyResult>>,
}

/// A computed row or the reason it could not be computed
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ok(T),
    Failed(FailureRow),
}

/// Failed comparison, with the error rendered as text
#[derive(Debug, Serialize)]
pub struct FailureRow {
    pub from_period: String,
    pub to_period: String,
    pub error: String,
}

impl From<&PairFailure> for FailureRow {
    fn from(failure: &PairFailure) -> Self {
        Self {
            from_period: failure.from_period.clone(),
            to_period: failure.to_period.clone(),
            error: failure.error.to_string(),
        }
    }
}

/// Numeric fields of a result row, by JSON name
trait NumericFields {
    fn numeric_fields(&self) -> Vec<(&'static str, f64)>;
    fn describe(&self) -> String;
}

impl NumericFields for MigrationResult {
    fn numeric_fields(&self) -> Vec<(&'static str, f64)> {
        let mut fields = vec![
            ("interval_years", self.interval_years),
            ("mean_distance", self.mean_distance),
            ("rate", self.rate),
        ];
        if let Some(shift) = self.centroid_shift {
            fields.push(("centroid_shift", shift));
        }
        fields
    }

    fn describe(&self) -> String {
        format!("migration {} -> {}", self.from_period, self.to_period)
    }
}

impl NumericFields for AccuracyResult {
    fn numeric_fields(&self) -> Vec<(&'static str, f64)> {
        vec![("rmse", self.rmse), ("max_separation", self.max_separation)]
    }

    fn describe(&self) -> String {
        format!("accuracy {}", self.period)
    }
}

/// Names of the fields JSON cannot represent (NaN or infinite)
fn non_finite_fields<T: NumericFields>(row: &T) -> Vec<&'static str> {
    row.numeric_fields()
        .into_iter()
        .filter(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
        .collect()
}

fn outcome<T: Clone + NumericFields>(result: &Result<T, PairFailure>) -> Outcome<T> {
    match result {
        Ok(value) => {
            let non_finite = non_finite_fields(value);
            if !non_finite.is_empty() {
                tracing::warn!(
                    "{}: non-finite {} written as null",
                    value.describe(),
                    non_finite.join(", ")
                );
            }
            Outcome::Ok(value.clone())
        }
        Err(failure) => Outcome::Failed(failure.into()),
    }
}

impl From<&TimeSeriesReport> for ReportDocument {
    fn from(report: &TimeSeriesReport) -> Self {
        Self {
            mean_migration_rate: report.mean_migration_rate(),
            migration: report.migration.iter().map(outcome).collect(),
            accuracy: report.accuracy.iter().map(outcome).collect(),
        }
    }
}

impl ReportDocument {
    /// Write as JSON followed by a newline
    pub fn write_json<W: Write>(&self, mut writer: W, pretty: bool) -> Result<(), crate::CliError> {
        if pretty {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            serde_json::to_writer(&mut writer, self)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

/// Format a series of optional values, with `-` for failed comparisons
fn format_series<T>(results: &[Result<T, PairFailure>], value: impl Fn(&T) -> f64) -> String {
    let values: Vec<String> = results
        .iter()
        .map(|result| match result {
            Ok(item) => format!("{:.4}", value(item)),
            Err(_) => "-".to_string(),
        })
        .collect();
    format!("[{}]", values.join(", "))
}

/// Log the three result series
pub fn log_summary(report: &TimeSeriesReport) {
    tracing::info!(
        "Migration rates (m/year): {}",
        format_series(&report.migration, |m| m.rate)
    );
    tracing::info!(
        "RMSE values (m): {}",
        format_series(&report.accuracy, |a| a.rmse)
    );
    tracing::info!(
        "Max separation (m): {}",
        format_series(&report.accuracy, |a| a.max_separation)
    );
    if let Some(mean) = report.mean_migration_rate() {
        tracing::info!("Mean migration rate: {:.4} m/year", mean);
    }
}
