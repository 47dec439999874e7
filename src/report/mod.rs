//! Dashboard rendering and CSV export.

pub mod export;
pub mod generator;

pub use export::{export_to_path, ExportKind};
pub use generator::{
    generate_json_report, generate_markdown_report, generate_text_report, render_filter_result,
};
