//! Data models for the catalog dashboard.
//!
//! This module contains the core data structures used throughout
//! the application for representing titles, frequency tables, filters
//! and the rendered dashboard report.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Delimiter separating names inside a `cast` value.
pub const DEFAULT_CAST_DELIMITER: &str = ", ";

/// One row of the catalog table, with its derived fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    /// Display title of the content.
    pub title: Option<String>,
    /// Content category (e.g. "Movie", "TV Show").
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Date the title was added to the catalog.
    pub date_added: Option<NaiveDate>,
    /// Raw cast string.
    pub cast: Option<String>,
    /// Year extracted from `date_added`.
    pub year_added: Option<i32>,
    /// Month (1-12) extracted from `date_added`.
    pub month_added: Option<u32>,
    /// Number of characters in `title`.
    pub title_length: Option<usize>,
    /// Cast names, split and trimmed once at load time.
    #[serde(skip)]
    cast_members: Vec<String>,
    /// Every original cell of the row, verbatim.
    #[serde(skip)]
    fields: Vec<String>,
}

impl Title {
    /// Builds a title and computes its derived fields.
    pub fn new(
        title: Option<String>,
        kind: Option<String>,
        date_added: Option<NaiveDate>,
        cast: Option<String>,
        cast_delimiter: &str,
    ) -> Self {
        let cast_members = cast
            .as_deref()
            .map(|c| split_cast(c, cast_delimiter))
            .unwrap_or_default();

        Self {
            title_length: title.as_ref().map(|t| t.chars().count()),
            year_added: date_added.map(|d| d.year()),
            month_added: date_added.map(|d| d.month()),
            title,
            kind,
            date_added,
            cast,
            cast_members,
            fields: Vec::new(),
        }
    }

    /// Attaches the original row cells, used for verbatim export.
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Names appearing in the cast, in their original order.
    pub fn cast_members(&self) -> &[String] {
        &self.cast_members
    }

    /// Original cells of the row.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Title text or a placeholder when missing.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }
}

/// Split a cast string strictly on `delimiter`, trimming each segment.
///
/// Segments that are empty after trimming are not names and are dropped.
pub fn split_cast(cast: &str, delimiter: &str) -> Vec<String> {
    cast.split(delimiter)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// One `(value, count)` pair of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry<K> {
    pub value: K,
    pub count: usize,
}

/// An ordered mapping from a category value to its occurrence count.
///
/// The order is part of the table: the peak is always the first entry
/// holding the maximum count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable<K> {
    entries: Vec<FrequencyEntry<K>>,
}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: Ord> FrequencyTable<K> {
    /// Builds a table ordered by ascending key.
    pub fn from_counts(counts: BTreeMap<K, usize>) -> Self {
        Self {
            entries: counts
                .into_iter()
                .map(|(value, count)| FrequencyEntry { value, count })
                .collect(),
        }
    }
}

impl<K> FrequencyTable<K> {
    /// Builds a table from pairs that are already in their final order.
    pub fn from_ordered(pairs: Vec<(K, usize)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(value, count)| FrequencyEntry { value, count })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = &FrequencyEntry<K>> {
        self.entries.iter()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Largest count in the table.
    pub fn max_count(&self) -> Option<usize> {
        self.entries.iter().map(|e| e.count).max()
    }

    /// First value (in table order) holding the maximum count.
    pub fn peak(&self) -> Option<&K> {
        let mut best: Option<&FrequencyEntry<K>> = None;
        for entry in &self.entries {
            match best {
                Some(current) if entry.count <= current.count => {}
                _ => best = Some(entry),
            }
        }
        best.map(|e| &e.value)
    }

    /// Count recorded for `value`, if present.
    #[allow(dead_code)] // Lookup utility
    pub fn get(&self, value: &K) -> Option<usize>
    where
        K: PartialEq,
    {
        self.entries
            .iter()
            .find(|e| &e.value == value)
            .map(|e| e.count)
    }

    /// The first `n` entries; all of them when the table is shorter.
    pub fn top_n(&self, n: usize) -> FrequencyTable<K>
    where
        K: Clone,
    {
        Self {
            entries: self.entries.iter().take(n).cloned().collect(),
        }
    }

    /// Entries as plain `(value, count)` pairs.
    #[allow(dead_code)] // Conversion utility
    pub fn pairs(&self) -> Vec<(K, usize)>
    where
        K: Clone,
    {
        self.entries
            .iter()
            .map(|e| (e.value.clone(), e.count))
            .collect()
    }
}

/// Current filter selection on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Content type to match exactly.
    #[serde(rename = "type")]
    pub kind: String,
    /// Addition year to match.
    pub year: i32,
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type = {}, year = {}", self.kind, self.year)
    }
}

/// Scalar KPIs and derived tables for one loaded dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Number of rows in the table.
    pub total_titles: usize,
    /// Rows with a parseable `date_added`.
    pub dated_titles: usize,
    /// Year with the most titles added.
    pub peak_year: Option<i32>,
    /// Month with the most titles added.
    pub peak_month: Option<u32>,
    /// Title with the most characters.
    pub longest_title: Option<String>,
    /// Most frequent cast member.
    pub top_actor: Option<String>,
    /// Titles added per year, ascending.
    pub year_counts: FrequencyTable<i32>,
    /// Titles added per month, ascending.
    pub month_counts: FrequencyTable<u32>,
    /// Highest ranked cast members.
    pub top_actors: FrequencyTable<String>,
}

/// Metadata about a rendered dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path of the source dataset.
    pub source: String,
    /// Time the report was rendered.
    pub generated_at: DateTime<Utc>,
    /// Number of rows loaded.
    pub total_rows: usize,
    /// Rows whose `date_added` could not be parsed.
    pub unparsed_dates: usize,
}

/// Rows matching the current filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct FilterResult {
    pub selection: FilterSelection,
    pub rows: Vec<Title>,
}

/// The complete dashboard, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    pub summary: DashboardSummary,
    /// First rows of the dataset.
    pub preview: Vec<Title>,
    /// Current filter result, when a selection exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterResult>,
}

/// Human-readable month name for 1-12.
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| chrono::Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_derived_fields() {
        let title = Title::new(
            Some("Kota Factory".to_string()),
            Some("TV Show".to_string()),
            NaiveDate::from_ymd_opt(2021, 9, 24),
            Some("Mayur More, Jitendra Kumar".to_string()),
            DEFAULT_CAST_DELIMITER,
        );

        assert_eq!(title.year_added, Some(2021));
        assert_eq!(title.month_added, Some(9));
        assert_eq!(title.title_length, Some(12));
        assert_eq!(title.cast_members(), ["Mayur More", "Jitendra Kumar"]);
    }

    #[test]
    fn test_title_length_counts_characters() {
        let title = Title::new(Some("Amélie".to_string()), None, None, None, ", ");
        assert_eq!(title.title_length, Some(6));
    }

    #[test]
    fn test_null_date_yields_null_parts() {
        let title = Title::new(Some("A".to_string()), None, None, None, ", ");
        assert_eq!(title.year_added, None);
        assert_eq!(title.month_added, None);
        assert!(title.cast_members().is_empty());
    }

    #[test]
    fn test_split_cast() {
        assert_eq!(split_cast("X, Y", ", "), vec!["X", "Y"]);
        assert_eq!(split_cast("X,Y", ", "), vec!["X,Y"]);
        assert_eq!(split_cast(" X, Y, ", ", "), vec!["X", "Y"]);
        assert_eq!(split_cast("X, , Y", ", "), vec!["X", "Y"]);
        assert!(split_cast("", ", ").is_empty());
    }

    #[test]
    fn test_frequency_table_peak_takes_first_maximum() {
        let table = FrequencyTable::from_ordered(vec![("a", 1), ("b", 3), ("c", 3)]);
        assert_eq!(table.peak(), Some(&"b"));
        assert_eq!(table.max_count(), Some(3));
        assert_eq!(table.total(), 7);

        let empty: FrequencyTable<&str> = FrequencyTable::default();
        assert_eq!(empty.peak(), None);
    }

    #[test]
    fn test_frequency_table_from_counts_is_ascending() {
        let counts: BTreeMap<i32, usize> = [(2020, 2), (2019, 1)].into_iter().collect();
        let table = FrequencyTable::from_counts(counts);
        assert_eq!(table.pairs(), vec![(2019, 1), (2020, 2)]);
        assert_eq!(table.get(&2020), Some(2));
        assert_eq!(table.get(&2018), None);
    }

    #[test]
    fn test_top_n_shorter_table() {
        let table = FrequencyTable::from_ordered(vec![("x".to_string(), 2)]);
        assert_eq!(table.top_n(10).len(), 1);
        assert_eq!(table.top_n(0).len(), 0);
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(13), "Unknown");
    }

    #[test]
    fn test_filter_selection_display() {
        let selection = FilterSelection {
            kind: "Movie".to_string(),
            year: 2020,
        };
        assert_eq!(selection.to_string(), "type = Movie, year = 2020");
    }
}
