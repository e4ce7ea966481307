//! Command line front-end for meander-lib
//!
//! Loads a time series of centerlines (GPX files or a JSON series), runs the
//! migration analysis and writes the results as a JSON report.

mod input;
mod report;
mod settings;

pub use input::{SeriesFile, load_entries, parse_series};
pub use report::{FailureRow, Outcome, ReportDocument, log_summary};
pub use settings::{MatcherArg, PeriodSpec, Settings};

use meander_lib::{MigrationAnalysis, MigrationError};
use std::io::BufWriter;

/// Errors that abort a command line run
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Analysis(#[from] MigrationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No periods given: pass YEAR=FILE.gpx arguments or --series FILE")]
    NoInput,
}

/// Log version information
pub fn log_version_info() {
    tracing::info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
}

/// Run one analysis as described by the settings
pub fn run(settings: &Settings) -> Result<(), CliError> {
    let entries = load_entries(settings)?;
    for entry in &entries {
        tracing::debug!(
            "Period {} ({}): {} parts, {} points",
            entry.label,
            entry.year,
            entry.centerline.part_count(),
            entry.centerline.point_count()
        );
    }

    let report = MigrationAnalysis::new(settings.config(), entries)?.run();
    log_summary(&report);

    let document = ReportDocument::from(&report);
    match &settings.output {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            document.write_json(BufWriter::new(file), settings.pretty)?;
            tracing::info!("Report written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            document.write_json(stdout.lock(), settings.pretty)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_run_series_file_to_output() {
        let dir = std::env::temp_dir().join(format!("meander-cli-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let series = dir.join("series.json");
        let output = dir.join("report.json");
        std::fs::write(
            &series,
            r#"{ "periods": [
                { "label": "1995", "year": 1995.0,
                  "centerline": { "Line": [ { "x": 0.0, "y": 0.0 }, { "x": 10.0, "y": 0.0 } ] } },
                { "label": "2005", "year": 2005.0,
                  "centerline": { "Line": [ { "x": 0.0, "y": 2.0 }, { "x": 10.0, "y": 2.0 } ] } }
            ] }"#,
        )
        .unwrap();

        let settings = Settings::try_parse_from([
            "meander",
            "--series",
            series.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        run(&settings).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["migration"][0]["status"], "ok");
        assert!((value["migration"][0]["rate"].as_f64().unwrap() - 0.2).abs() < 1e-9);
        assert!((value["accuracy"][0]["rmse"].as_f64().unwrap() - 2.0).abs() < 1e-9);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_run_single_period_fails() {
        let dir = std::env::temp_dir().join(format!("meander-cli-single-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let series = dir.join("series.json");
        std::fs::write(
            &series,
            r#"{ "periods": [ { "label": "1995", "year": 1995.0, "centerline": { "Line": [] } } ] }"#,
        )
        .unwrap();

        let settings =
            Settings::try_parse_from(["meander", "--series", series.to_str().unwrap()]).unwrap();
        assert!(matches!(
            run(&settings),
            Err(CliError::Analysis(MigrationError::InsufficientPeriods { found: 1 }))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
