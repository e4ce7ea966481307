use clap::{Parser, ValueEnum};
use meander_lib::{Config, MatcherKind};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Meander Migration - Quantify river centerline migration between time-ordered snapshots
pub struct Settings {
    /// Periods to compare, in chronological order, as YEAR=FILE.gpx
    #[clap(value_name = "YEAR=FILE")]
    pub periods: Vec<PeriodSpec>,

    /// JSON time series with planar coordinates in meters (instead of GPX periods)
    #[clap(short, long, value_name = "FILE", conflicts_with = "periods")]
    pub series: Option<PathBuf>,

    /// Fixed interval between consecutive periods in years (default: difference of period years)
    #[clap(short, long)]
    pub interval: Option<f64>,

    /// Clamp maximum separation values to this distance in meters
    #[clap(long, default_value = "1000.0")]
    pub max_separation_cutoff: f64,

    /// Nearest-neighbor strategy
    #[clap(long, value_enum, default_value = "brute-force")]
    pub matcher: MatcherArg,

    /// Compare period pairs one after another instead of in parallel
    #[clap(long, default_value = "false")]
    pub sequential: bool,

    /// Write the JSON report to this file instead of stdout
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[clap(long, default_value = "false")]
    pub pretty: bool,
}

/// Nearest-neighbor strategy as exposed on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherArg {
    BruteForce,
    #[value(name = "rtree")]
    RTree,
}

impl From<MatcherArg> for MatcherKind {
    fn from(arg: MatcherArg) -> Self {
        match arg {
            MatcherArg::BruteForce => MatcherKind::BruteForce,
            MatcherArg::RTree => MatcherKind::RTree,
        }
    }
}

/// One `YEAR=FILE` period argument
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSpec {
    /// Period label, the year exactly as typed
    pub label: String,
    /// Decimal year
    pub year: f64,
    /// GPX file holding the centerline
    pub path: PathBuf,
}

impl FromStr for PeriodSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year_text, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected YEAR=FILE, got '{s}'"))?;

        let label = year_text.trim();
        let year: f64 = label
            .parse()
            .map_err(|_| format!("invalid year '{label}' in '{s}'"))?;
        if !year.is_finite() {
            return Err(format!("invalid year '{label}' in '{s}'"));
        }
        if path.is_empty() {
            return Err(format!("missing file in '{s}'"));
        }

        Ok(Self {
            label: label.to_string(),
            year,
            path: PathBuf::from(path),
        })
    }
}

impl Settings {
    /// Parse from the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Analysis configuration described by these settings
    pub fn config(&self) -> Config {
        Config {
            interval_years: self.interval,
            max_separation_cutoff: self.max_separation_cutoff,
            matcher: self.matcher.into(),
            parallel: !self.sequential,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_spec_parsing() {
        let period: PeriodSpec = "1995=data/centerline_1995.gpx".parse().unwrap();
        assert_eq!(period.label, "1995");
        assert_eq!(period.year, 1995.0);
        assert_eq!(period.path, PathBuf::from("data/centerline_1995.gpx"));

        let period: PeriodSpec = "2004.5=mid.gpx".parse().unwrap();
        assert_eq!(period.year, 2004.5);
    }

    #[test]
    fn test_period_spec_errors() {
        assert!("centerline.gpx".parse::<PeriodSpec>().is_err());
        assert!("nineteen=a.gpx".parse::<PeriodSpec>().is_err());
        assert!("1995=".parse::<PeriodSpec>().is_err());
        assert!("inf=a.gpx".parse::<PeriodSpec>().is_err());
    }

    #[test]
    fn test_defaults_map_to_config() {
        let settings = Settings::try_parse_from(["meander", "1995=a.gpx", "2005=b.gpx"]).unwrap();
        assert_eq!(settings.periods.len(), 2);

        let config = settings.config();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_flags_map_to_config() {
        let settings = Settings::try_parse_from([
            "meander",
            "--interval",
            "10",
            "--max-separation-cutoff",
            "250",
            "--matcher",
            "rtree",
            "--sequential",
            "1995=a.gpx",
            "2005=b.gpx",
        ])
        .unwrap();

        let config = settings.config();
        assert_eq!(config.interval_years, Some(10.0));
        assert_eq!(config.max_separation_cutoff, 250.0);
        assert_eq!(config.matcher, MatcherKind::RTree);
        assert!(!config.parallel);
    }

    #[test]
    fn test_series_conflicts_with_periods() {
        let result = Settings::try_parse_from(["meander", "--series", "s.json", "1995=a.gpx"]);
        assert!(result.is_err());

        let settings = Settings::try_parse_from(["meander", "--series", "s.json"]).unwrap();
        assert_eq!(settings.series, Some(PathBuf::from("s.json")));
        assert!(settings.periods.is_empty());
    }
}
