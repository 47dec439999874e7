//! CSV export of dashboard tables.
//!
//! Tables are written verbatim: original cells as loaded, followed by the
//! derived columns.

use crate::analysis::actor_frequency;
use crate::models::{FrequencyTable, Title};
use crate::session::Session;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Columns appended to every exported title row.
pub const DERIVED_COLUMNS: [&str; 3] = ["year_added", "month_added", "title_length"];

/// Which table to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportKind {
    /// Full cast ranking (name, count)
    Actors,
    /// Rows matching the current filter
    Filtered,
    /// Every row of the dataset
    Full,
}

impl ExportKind {
    /// File name used when no export path is given.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            ExportKind::Actors => "actor_counts.csv",
            ExportKind::Filtered => "filtered_titles.csv",
            ExportKind::Full => "titles_full.csv",
        }
    }
}

/// Write a cast ranking as `name,count` rows.
pub fn write_actor_ranking<W: Write>(table: &FrequencyTable<String>, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(["name", "count"])?;
    for entry in table.iter() {
        let count = entry.count.to_string();
        csv_writer.write_record([entry.value.as_str(), count.as_str()])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write title rows under the original headers plus the derived columns.
pub fn write_titles<'a, W, I>(headers: &[String], rows: I, writer: W) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Title>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);

    let header_row: Vec<&str> = headers
        .iter()
        .map(String::as_str)
        .chain(DERIVED_COLUMNS)
        .collect();
    csv_writer.write_record(&header_row)?;

    for title in rows {
        let mut record: Vec<String> = title
            .fields()
            .iter()
            .take(headers.len())
            .cloned()
            .collect();
        record.resize(headers.len(), String::new());

        record.push(optional_cell(title.year_added));
        record.push(optional_cell(title.month_added));
        record.push(optional_cell(title.title_length));

        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn optional_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Export one of the session tables into `writer`. Returns the row count.
pub fn export_table<W: Write>(kind: ExportKind, session: &Session, writer: W) -> Result<usize> {
    let dataset = session.dataset();

    match kind {
        ExportKind::Actors => {
            let ranking = actor_frequency(dataset.titles());
            write_actor_ranking(&ranking, writer)?;
            Ok(ranking.len())
        }
        ExportKind::Filtered => {
            let rows = session.filtered().map(|f| f.rows.as_slice()).unwrap_or(&[]);
            write_titles(dataset.headers(), rows, writer)?;
            Ok(rows.len())
        }
        ExportKind::Full => {
            write_titles(dataset.headers(), dataset.titles(), writer)?;
            Ok(dataset.len())
        }
    }
}

/// Export one of the session tables to a file. Returns the row count.
pub fn export_to_path(kind: ExportKind, session: &Session, path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;

    let rows = export_table(kind, session, file)
        .with_context(|| format!("Failed to export {:?} table", kind))?;

    info!("Exported {} rows to {}", rows, path.display());
    Ok(rows)
}
