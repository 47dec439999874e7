//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.streamstats.toml` files.

use crate::cli::OutputFormat;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".streamstats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset parsing settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Initial filter selection.
    #[serde(default)]
    pub filter: FilterConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Path of the titles CSV.
    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Rows shown in the dataset preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            verbose: false,
            preview_rows: default_preview_rows(),
        }
    }
}

fn default_data_path() -> String {
    "data/netflix_titles.csv".to_string()
}

fn default_preview_rows() -> usize {
    10
}

/// How rows of the dataset are interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Delimiter between names in the `cast` column.
    #[serde(default = "default_cast_delimiter")]
    pub cast_delimiter: String,

    /// `chrono` formats tried in order for `date_added`.
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            cast_delimiter: default_cast_delimiter(),
            date_formats: default_date_formats(),
        }
    }
}

fn default_cast_delimiter() -> String {
    crate::models::DEFAULT_CAST_DELIMITER.to_string()
}

fn default_date_formats() -> Vec<String> {
    crate::dataset::loader::default_date_formats()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Cast members listed in the ranking.
    #[serde(default = "default_top_actors")]
    pub top_actors: usize,

    /// Width of the longest chart bar, in cells.
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,

    /// Output format of the dashboard.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_actors: default_top_actors(),
            chart_width: default_chart_width(),
            format: OutputFormat::default(),
        }
    }
}

fn default_top_actors() -> usize {
    10
}

fn default_chart_width() -> usize {
    40
}

/// Initial filter selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Content type selected at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_type: Option<String>,

    /// Year selected at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_year: Option<i32>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when explicitly given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.general.data_path = data.display().to_string();
        }
        if let Some(preview) = args.preview {
            self.general.preview_rows = preview;
        }
        if let Some(top) = args.top {
            self.report.top_actors = top;
        }
        if let Some(width) = args.chart_width {
            self.report.chart_width = width;
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(ref kind) = args.kind {
            self.filter.default_type = Some(kind.clone());
        }
        if let Some(year) = args.year {
            self.filter.default_year = Some(year);
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check values that would make the dashboard meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.dataset.cast_delimiter.is_empty() {
            bail!("[dataset] cast_delimiter cannot be empty");
        }
        if self.dataset.date_formats.is_empty() {
            bail!("[dataset] date_formats must list at least one format");
        }
        if self.report.top_actors == 0 {
            bail!("[report] top_actors must be at least 1");
        }
        if self.report.chart_width == 0 {
            bail!("[report] chart_width must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
