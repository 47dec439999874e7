//! CSV dataset loader.
//!
//! Reads the catalog CSV, checks the header for required columns and
//! materializes every row as a [`Title`] with its derived fields.

use super::{Dataset, DatasetError};
use crate::models::{Title, DEFAULT_CAST_DELIMITER};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns the dashboard cannot work without.
pub const REQUIRED_COLUMNS: [&str; 4] = ["title", "type", "date_added", "cast"];

/// Options controlling how rows are interpreted.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Delimiter separating names in the `cast` column.
    pub cast_delimiter: String,
    /// `chrono` formats tried in order when parsing `date_added`.
    pub date_formats: Vec<String>,
    /// Show a spinner while reading.
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            cast_delimiter: DEFAULT_CAST_DELIMITER.to_string(),
            date_formats: default_date_formats(),
            show_progress: false,
        }
    }
}

impl From<&crate::config::DatasetConfig> for LoadOptions {
    fn from(config: &crate::config::DatasetConfig) -> Self {
        Self {
            cast_delimiter: config.cast_delimiter.clone(),
            date_formats: config.date_formats.clone(),
            show_progress: false,
        }
    }
}

/// Date formats understood out of the box.
pub fn default_date_formats() -> Vec<String> {
    vec!["%B %d, %Y", "%b %d, %Y", "%Y-%m-%d", "%m/%d/%Y", "%d-%b-%y"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Positions of the required columns in the header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    title: usize,
    kind: usize,
    date_added: usize,
    cast: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[String], path: &Path) -> Result<Self, DatasetError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| DatasetError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                })
        };

        Ok(Self {
            title: find(REQUIRED_COLUMNS[0])?,
            kind: find(REQUIRED_COLUMNS[1])?,
            date_added: find(REQUIRED_COLUMNS[2])?,
            cast: find(REQUIRED_COLUMNS[3])?,
        })
    }
}

/// Load a dataset from a CSV file.
pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<Dataset, DatasetError> {
    info!("Loading dataset: {}", path.display());

    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    load_from_reader(file, path, options)
}

/// Load a dataset from any reader; `path` is only used for reporting.
pub fn load_from_reader<R: Read>(
    reader: R,
    path: &Path,
    options: &LoadOptions,
) -> Result<Dataset, DatasetError> {
    let csv_error = |source| DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let columns = ColumnIndex::resolve(&headers, path)?;
    debug!("Resolved columns: {:?}", columns);

    let progress = options.show_progress.then(loading_spinner);

    let mut titles = Vec::new();
    let mut unparsed_dates = 0;

    for result in reader.records() {
        let record = result.map_err(csv_error)?;

        let raw_date = cell(&record, columns.date_added);
        let date_added = raw_date
            .as_deref()
            .and_then(|d| parse_date(d, &options.date_formats));

        if let (Some(raw), None) = (&raw_date, date_added) {
            debug!("Unparseable date_added {:?} on row {}", raw, titles.len() + 1);
            unparsed_dates += 1;
        }

        let title = Title::new(
            cell(&record, columns.title),
            cell(&record, columns.kind),
            date_added,
            cell(&record, columns.cast),
            &options.cast_delimiter,
        )
        .with_fields(record.iter().map(String::from).collect());

        titles.push(title);

        if let Some(ref pb) = progress {
            if titles.len() % 1000 == 0 {
                pb.set_message(format!("{} rows", titles.len()));
            }
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if unparsed_dates > 0 {
        warn!(
            "{} rows have an unparseable date_added and are excluded from date statistics",
            unparsed_dates
        );
    }
    info!("Loaded {} titles from {}", titles.len(), path.display());

    Ok(Dataset::new(
        path.to_path_buf(),
        headers,
        titles,
        unparsed_dates,
    ))
}

/// A cell value, or `None` when the cell is absent or blank.
fn cell(record: &StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .filter(|value| !value.trim().is_empty())
        .map(String::from)
}

/// Parse a `date_added` value leniently.
///
/// Each format is tried in order, then RFC 3339 and `YYYY-MM-DD HH:MM:SS`
/// timestamps. Anything else yields `None`.
pub fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn loading_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Loading titles...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
show_id,type,title,director,cast,country,date_added,release_year
s1,Movie,Dick Johnson Is Dead,Kirsten Johnson,,United States,\"September 25, 2021\",2020
s2,TV Show,Blood & Water,,\"Ama Qamata, Khosi Ngema, Gail Mabalane\",South Africa,\"September 24, 2021\",2021
s3,TV Show,Ganglands,Julien Leclercq,\"Sami Bouajila, Tracy Gotoas\",,\" August 4, 2017\",2021
s4,Movie,Broken Date,,Khosi Ngema,,not a date,2019
";

    fn load_str(content: &str) -> Result<Dataset, DatasetError> {
        load_from_reader(
            content.as_bytes(),
            Path::new("sample.csv"),
            &LoadOptions::default(),
        )
    }

    #[test]
    fn test_load_sample() {
        let dataset = load_str(SAMPLE).unwrap();

        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.headers()[2], "title");
        assert_eq!(dataset.unparsed_dates(), 1);

        let first = &dataset.titles()[0];
        assert_eq!(first.title.as_deref(), Some("Dick Johnson Is Dead"));
        assert_eq!(first.kind.as_deref(), Some("Movie"));
        assert_eq!(first.year_added, Some(2021));
        assert_eq!(first.month_added, Some(9));
        assert_eq!(first.cast, None);
        assert_eq!(first.fields().len(), 8);

        let second = &dataset.titles()[1];
        assert_eq!(
            second.cast_members(),
            ["Ama Qamata", "Khosi Ngema", "Gail Mabalane"]
        );

        assert_eq!(dataset.titles()[2].month_added, Some(8));
        assert_eq!(dataset.titles()[3].year_added, None);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let err = load_str("title,type,cast\nA,Movie,X\n").unwrap_err();

        match err {
            DatasetError::MissingColumn { column, .. } => assert_eq!(column, "date_added"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_bom_and_whitespace_are_trimmed() {
        let content = "\u{feff} title ,type , date_added,cast\nA,Movie,2020-01-02,\"X, Y\"\n";
        let dataset = load_str(content).unwrap();

        assert_eq!(dataset.headers(), ["title", "type", "date_added", "cast"]);
        assert_eq!(dataset.titles()[0].title.as_deref(), Some("A"));
        assert_eq!(dataset.titles()[0].year_added, Some(2020));
        assert_eq!(dataset.titles()[0].cast_members(), ["X", "Y"]);
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let dataset = load_str("title,type,date_added,cast\n").unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_short_rows_are_null_padded() {
        let dataset = load_str("title,type,date_added,cast\nA,Movie\n").unwrap();
        let row = &dataset.titles()[0];

        assert_eq!(row.title.as_deref(), Some("A"));
        assert_eq!(row.date_added, None);
        assert_eq!(row.cast, None);
        assert_eq!(dataset.unparsed_dates(), 0);
    }

    #[test]
    fn test_custom_cast_delimiter() {
        let options = LoadOptions {
            cast_delimiter: "|".to_string(),
            ..LoadOptions::default()
        };
        let dataset = load_from_reader(
            "title,type,date_added,cast\nA,Movie,2020-01-01,X|Y\n".as_bytes(),
            Path::new("pipe.csv"),
            &options,
        )
        .unwrap();

        assert_eq!(dataset.titles()[0].cast_members(), ["X", "Y"]);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("titles.csv");
        std::fs::write(&path, SAMPLE).unwrap();

        let dataset = load_dataset(&path, &LoadOptions::default()).unwrap();
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.source(), path.as_path());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_dataset(Path::new("/nonexistent/titles.csv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn test_parse_date_formats() {
        let formats = default_date_formats();
        let expected = NaiveDate::from_ymd_opt(2020, 1, 2);

        assert_eq!(parse_date("January 2, 2020", &formats), expected);
        assert_eq!(parse_date(" January 2, 2020 ", &formats), expected);
        assert_eq!(parse_date("Jan 2, 2020", &formats), expected);
        assert_eq!(parse_date("2020-01-02", &formats), expected);
        assert_eq!(parse_date("01/02/2020", &formats), expected);
        assert_eq!(parse_date("02-Jan-20", &formats), expected);
        assert_eq!(parse_date("2020-01-02T10:00:00Z", &formats), expected);
        assert_eq!(parse_date("2020-01-02 10:00:00", &formats), expected);
    }

    #[test]
    fn test_parse_date_failures() {
        let formats = default_date_formats();

        assert_eq!(parse_date("", &formats), None);
        assert_eq!(parse_date("someday", &formats), None);
        assert_eq!(parse_date("2020-13-45", &formats), None);
    }

    #[test]
    fn test_load_fixture_dataset() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/titles.csv");
        let dataset = load_dataset(&path, &LoadOptions::default()).unwrap();
        let summary = crate::analysis::summarize(dataset.titles(), 3);

        assert_eq!(dataset.len(), 14);
        assert_eq!(dataset.unparsed_dates(), 0);
        assert_eq!(summary.dated_titles, 13);
        assert_eq!(summary.peak_year, Some(2021));
        assert_eq!(summary.peak_month, Some(9));
        assert_eq!(
            summary.longest_title.as_deref(),
            Some("My Little Pony: A New Generation")
        );
        assert_eq!(summary.top_actor.as_deref(), Some("Adam Sandler"));
        assert_eq!(summary.top_actors.max_count(), Some(2));
    }
}
