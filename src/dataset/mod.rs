//! Catalog dataset loading and caching.
//!
//! The dataset is read once from CSV, its derived fields are computed at
//! load time, and the resulting table is shared immutably afterwards.

pub mod cache;
pub mod loader;

pub use cache::DatasetCache;
pub use loader::{load_dataset, LoadOptions};

use crate::models::Title;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be opened or read.
    #[error("failed to read dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid CSV.
    #[error("malformed CSV in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    /// A required column is absent from the header row.
    #[error("dataset {} is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// An immutable, fully loaded title table.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: PathBuf,
    headers: Vec<String>,
    titles: Vec<Title>,
    unparsed_dates: usize,
}

impl Dataset {
    /// Build a dataset from already materialized rows.
    pub fn new(
        source: PathBuf,
        headers: Vec<String>,
        titles: Vec<Title>,
        unparsed_dates: usize,
    ) -> Self {
        Self {
            source,
            headers,
            titles,
            unparsed_dates,
        }
    }

    /// Path the dataset was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Original header row.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All rows in file order.
    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Rows whose non-empty `date_added` could not be parsed.
    pub fn unparsed_dates(&self) -> usize {
        self.unparsed_dates
    }

    /// Distinct content types, sorted.
    pub fn type_options(&self) -> Vec<String> {
        self.titles
            .iter()
            .filter_map(|t| t.kind.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct addition years, ascending.
    pub fn year_options(&self) -> Vec<i32> {
        self.titles
            .iter()
            .filter_map(|t| t.year_added)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
