//! Dashboard report generation.
//!
//! This module renders the dashboard as plain terminal text, Markdown or
//! JSON.

use crate::models::{
    month_name, DashboardReport, DashboardSummary, FilterResult, FrequencyTable, ReportMetadata,
    Title,
};
use anyhow::Result;
use std::fmt::Display;

/// Placeholder shown for undefined aggregates.
pub const PLACEHOLDER: &str = "n/a";

const MAX_CELL_CHARS: usize = 60;

/// Generate the complete Markdown dashboard.
pub fn generate_markdown_report(report: &DashboardReport, chart_width: usize) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Streaming Catalog Dashboard 🎬📊\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_kpi_section(&report.summary));
    output.push_str(&generate_charts_section(&report.summary, chart_width));
    output.push_str(&generate_actors_section(&report.summary.top_actors));
    output.push_str(&generate_preview_section(&report.preview));

    if let Some(ref filter) = report.filter {
        output.push_str(&generate_filter_section(filter));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the dashboard as plain terminal text.
pub fn generate_text_report(report: &DashboardReport, chart_width: usize) -> String {
    let mut output = String::new();
    let summary = &report.summary;

    output.push_str("STREAMING CATALOG DASHBOARD\n");
    output.push_str(&format!("{}\n\n", "=".repeat(27)));

    output.push_str(&format!("Source:    {}\n", report.metadata.source));
    output.push_str(&format!(
        "Generated: {}\n",
        report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("Titles:    {}\n", report.metadata.total_rows));
    if report.metadata.unparsed_dates > 0 {
        output.push_str(&format!(
            "Unparseable dates: {}\n",
            report.metadata.unparsed_dates
        ));
    }
    output.push('\n');

    output.push_str(&text_heading("Key Figures"));
    let rows = kpi_rows(summary);
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in rows {
        output.push_str(&format!("{:<label_width$}  {}\n", label, value));
    }
    output.push('\n');

    output.push_str(&text_heading("Titles Added per Year"));
    output.push_str(&text_chart(render_bar_chart(
        &summary.year_counts,
        chart_width,
        |year| year.to_string(),
    )));

    output.push_str(&text_heading("Titles Added per Month"));
    output.push_str(&text_chart(render_bar_chart(
        &summary.month_counts,
        chart_width,
        |month| month_name(*month).to_string(),
    )));

    output.push_str(&text_heading(&format!(
        "Top {} Cast Members",
        summary.top_actors.len()
    )));
    if summary.top_actors.is_empty() {
        output.push_str("No cast information available.\n");
    }
    for (i, entry) in summary.top_actors.iter().enumerate() {
        output.push_str(&format!("{:>3}. {} ({})\n", i + 1, entry.value, entry.count));
    }
    output.push('\n');

    output.push_str(&text_heading("Dataset Preview"));
    output.push_str(&render_titles_lines(&report.preview));

    if let Some(ref filter) = report.filter {
        output.push_str(&text_heading(&format!(
            "Filtered Titles ({}): {} matching",
            filter.selection,
            filter.rows.len()
        )));
        output.push_str(&render_titles_lines(&filter.rows));
    }

    output
}

fn text_heading(title: &str) -> String {
    format!("{}\n{}\n", title, "-".repeat(title.chars().count()))
}

fn text_chart(body: String) -> String {
    if body.is_empty() {
        return "No dated titles.\n\n".to_string();
    }
    format!("{}\n", body)
}

/// Render titles as one plain line each.
fn render_titles_lines(titles: &[Title]) -> String {
    if titles.is_empty() {
        return "No titles.\n\n".to_string();
    }

    let mut lines = String::new();
    for title in titles {
        lines.push_str(&format!(
            "- [{}] {} ({})\n",
            title.kind.as_deref().unwrap_or(PLACEHOLDER),
            title.display_title(),
            title
                .date_added
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        ));
    }
    lines.push('\n');

    lines
}

/// Generate a JSON report.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Titles:** {}\n", metadata.total_rows));
    if metadata.unparsed_dates > 0 {
        section.push_str(&format!(
            "- **Unparseable Dates:** {}\n",
            metadata.unparsed_dates
        ));
    }
    section.push('\n');

    section
}

/// Generate the KPI table.
fn generate_kpi_section(summary: &DashboardSummary) -> String {
    let mut section = String::new();

    section.push_str("## Key Figures\n\n");
    section.push_str("| Metric | Value |\n");
    section.push_str("|:---|:---|\n");

    for (label, value) in kpi_rows(summary) {
        section.push_str(&format!("| {} | {} |\n", label, escape_cell(&value)));
    }
    section.push('\n');

    section
}

/// KPI labels and display values, with placeholders for undefined values.
pub fn kpi_rows(summary: &DashboardSummary) -> Vec<(&'static str, String)> {
    vec![
        (
            "Year with most content added",
            display_or_placeholder(summary.peak_year),
        ),
        (
            "Month with most content added",
            summary
                .peak_month
                .map(|m| month_name(m).to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        ),
        (
            "Longest title",
            display_or_placeholder(summary.longest_title.as_deref()),
        ),
        (
            "Most frequent cast member",
            display_or_placeholder(summary.top_actor.as_deref()),
        ),
    ]
}

fn display_or_placeholder<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Generate the year and month charts.
fn generate_charts_section(summary: &DashboardSummary, width: usize) -> String {
    let mut section = String::new();

    section.push_str("## Titles Added per Year\n\n");
    section.push_str(&fenced(render_bar_chart(
        &summary.year_counts,
        width,
        |year| year.to_string(),
    )));

    section.push_str("## Titles Added per Month\n\n");
    section.push_str(&fenced(render_bar_chart(
        &summary.month_counts,
        width,
        |month| month_name(*month).to_string(),
    )));

    section
}

fn fenced(body: String) -> String {
    if body.is_empty() {
        return "*No dated titles.*\n\n".to_string();
    }
    format!("```text\n{}```\n\n", body)
}

/// Render a frequency table as horizontal text bars.
///
/// The longest bar spans `width` cells; every non-zero count gets at
/// least one cell.
pub fn render_bar_chart<K>(
    table: &FrequencyTable<K>,
    width: usize,
    label: impl Fn(&K) -> String,
) -> String {
    let Some(max) = table.max_count().filter(|m| *m > 0) else {
        return String::new();
    };

    let labels: Vec<String> = table.iter().map(|e| label(&e.value)).collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut chart = String::new();
    for (entry, label) in table.iter().zip(labels) {
        let cells = (entry.count * width).div_ceil(max).max(1);
        chart.push_str(&format!(
            "{:<label_width$} | {} {}\n",
            label,
            "█".repeat(cells),
            entry.count,
        ));
    }

    chart
}

/// Generate the cast ranking section.
fn generate_actors_section(top_actors: &FrequencyTable<String>) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Top {} Cast Members\n\n", top_actors.len()));

    if top_actors.is_empty() {
        section.push_str("*No cast information available.*\n\n");
        return section;
    }

    section.push_str("| # | Name | Titles |\n");
    section.push_str("|:---:|:---|:---:|\n");
    for (i, entry) in top_actors.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            i + 1,
            escape_cell(&entry.value),
            entry.count
        ));
    }
    section.push('\n');

    section
}

/// Generate the dataset preview section.
fn generate_preview_section(preview: &[Title]) -> String {
    let mut section = String::new();

    section.push_str("## Dataset Preview\n\n");
    section.push_str(&render_titles_table(preview));

    section
}

/// Generate the filter result section.
fn generate_filter_section(filter: &FilterResult) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Filtered Titles ({})\n\n", filter.selection));
    section.push_str(&format!("*{} matching titles*\n\n", filter.rows.len()));
    section.push_str(&render_titles_table(&filter.rows));

    section
}

/// Render titles as a Markdown table.
pub fn render_titles_table(titles: &[Title]) -> String {
    if titles.is_empty() {
        return "*No titles.*\n\n".to_string();
    }

    let mut table = String::new();
    table.push_str("| Type | Title | Date Added | Cast |\n");
    table.push_str("|:---|:---|:---:|:---|\n");

    for title in titles {
        table.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            escape_cell(title.kind.as_deref().unwrap_or("")),
            escape_cell(title.display_title()),
            title
                .date_added
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            escape_cell(title.cast.as_deref().unwrap_or("")),
        ));
    }
    table.push('\n');

    table
}

/// Render a filter result for the interactive session.
pub fn render_filter_result(filter: &FilterResult) -> String {
    generate_filter_section(filter)
}

/// Escape pipes and shorten long values for a table cell.
fn escape_cell(value: &str) -> String {
    let shortened: String = if value.chars().count() > MAX_CELL_CHARS {
        let mut s: String = value.chars().take(MAX_CELL_CHARS - 1).collect();
        s.push('…');
        s
    } else {
        value.to_string()
    };

    shortened.replace('|', "\\|")
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Generated by streamstats v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}
