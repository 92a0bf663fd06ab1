//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Titanic survival dashboard
///
/// Loads the Kaggle Titanic training CSV and explores survival by gender,
/// class, age, fare and family size in the terminal.
///
/// Examples:
///   titanic-dash --data data/titanic.csv
///   titanic-dash --summary > summary.json
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Passenger CSV to load
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "data/titanic.csv",
        env = "TITANIC_DATA"
    )]
    pub data: PathBuf,

    /// File the log is written to; the terminal belongs to the dashboard
    #[arg(long, value_name = "FILE", default_value = "titanic-dash.log")]
    pub log_file: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Redraw interval of the dashboard in milliseconds
    #[arg(long, value_name = "MS", default_value = "200")]
    pub tick_rate_ms: u64,

    /// Print the computed statistics as JSON and exit
    #[arg(long)]
    pub summary: bool,
}

impl Args {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["titanic-dash"]).unwrap();
        assert_eq!(args.log_file, PathBuf::from("titanic-dash.log"));
        assert_eq!(args.log_level, "info");
        assert_eq!(args.tick_rate(), Duration::from_millis(200));
        assert!(!args.summary);
    }

    #[test]
    fn explicit_values() {
        let args = Args::try_parse_from([
            "titanic-dash",
            "--data",
            "train.csv",
            "--tick-rate-ms",
            "0",
            "--summary",
        ])
        .unwrap();
        assert_eq!(args.data, PathBuf::from("train.csv"));
        assert_eq!(args.tick_rate(), Duration::from_millis(1));
        assert!(args.summary);
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
