//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::report::ExportKind;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// StreamStats - terminal dashboard for streaming-catalog titles
///
/// Loads a titles CSV, computes the headline statistics (busiest year and
/// month, longest title, most frequent cast member), draws charts and
/// filter results, and exports tables as CSV.
///
/// Examples:
///   streamstats --data data/netflix_titles.csv
///   streamstats --type Movie --year 2020 --output dashboard.md
///   streamstats --format json --output dashboard.json
///   streamstats --export actors --export-path actors.csv
///   streamstats --interactive
///   streamstats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Titles CSV to load
    ///
    /// Must contain the columns title, type, date_added and cast.
    /// Defaults to the config value, then data/netflix_titles.csv.
    #[arg(short, long, value_name = "FILE", env = "STREAMSTATS_DATA")]
    pub data: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .streamstats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Content type to filter on (e.g. "Movie", "TV Show")
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub kind: Option<String>,

    /// Addition year to filter on
    #[arg(short, long, value_name = "YEAR")]
    pub year: Option<i32>,

    /// Number of cast members in the ranking
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Number of dataset rows shown in the preview
    #[arg(long, value_name = "ROWS")]
    pub preview: Option<usize>,

    /// Width of the longest chart bar
    #[arg(long, value_name = "CELLS")]
    pub chart_width: Option<usize>,

    /// Output format (text, markdown, json)
    ///
    /// Defaults to the config value, then markdown.
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the dashboard to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Export a table as CSV (actors, filtered, full)
    #[arg(long, value_name = "TABLE")]
    pub export: Option<ExportKind>,

    /// Destination of the CSV export
    ///
    /// Defaults to a file named after the exported table.
    #[arg(long, value_name = "FILE", requires = "export")]
    pub export_path: Option<PathBuf>,

    /// Start an interactive session after rendering the dashboard
    #[arg(short, long)]
    pub interactive: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .streamstats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain terminal text
    Text,
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top == Some(0) {
            return Err("Top count must be at least 1".to_string());
        }

        if self.chart_width == Some(0) {
            return Err("Chart width must be at least 1".to_string());
        }

        if let Some(ref kind) = self.kind {
            if kind.trim().is_empty() {
                return Err("Type filter cannot be empty".to_string());
            }
        }

        if let Some(ref data) = self.data {
            if !data.exists() {
                return Err(format!("Dataset file does not exist: {}", data.display()));
            }
            if !data.is_file() {
                return Err(format!("Dataset path is not a file: {}", data.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` value; `--quiet` wins
    /// over both.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Destination of the requested export, if any.
    pub fn effective_export_path(&self) -> Option<PathBuf> {
        self.export.map(|kind| {
            self.export_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(kind.default_file_name()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data: None,
            config: None,
            kind: None,
            year: None,
            top: None,
            preview: None,
            chart_width: None,
            format: None,
            output: None,
            export: None,
            export_path: None,
            interactive: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "streamstats",
            "--type",
            "TV Show",
            "--year",
            "2019",
            "--format",
            "json",
            "--export",
            "filtered",
        ])
        .unwrap();

        assert_eq!(args.kind.as_deref(), Some("TV Show"));
        assert_eq!(args.year, Some(2019));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.export, Some(ExportKind::Filtered));
    }

    #[test]
    fn test_parse_text_format() {
        let args = Args::try_parse_from(["streamstats", "--format", "text"]).unwrap();
        assert_eq!(args.format, Some(OutputFormat::Text));

        let args = Args::try_parse_from(["streamstats"]).unwrap();
        assert_eq!(args.format, None);
    }

    #[test]
    fn test_export_path_requires_export() {
        let result = Args::try_parse_from(["streamstats", "--export-path", "out.csv"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_effective_export_path() {
        let mut args = make_args();
        assert_eq!(args.effective_export_path(), None);

        args.export = Some(ExportKind::Actors);
        assert_eq!(
            args.effective_export_path(),
            Some(PathBuf::from("actor_counts.csv"))
        );

        args.export_path = Some(PathBuf::from("ranking.csv"));
        assert_eq!(
            args.effective_export_path(),
            Some(PathBuf::from("ranking.csv"))
        );
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_top() {
        let mut args = make_args();
        args.top = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_dataset() {
        let mut args = make_args();
        args.data = Some(PathBuf::from("/nonexistent/titles.csv"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_init_config_skips_checks() {
        let mut args = make_args();
        args.init_config = true;
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
