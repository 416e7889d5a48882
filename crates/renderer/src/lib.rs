//! Writes the pipeline's results as standalone, independently viewable documents.

use analytics::RollingWindowTable;
use data_quality::ValidationReport;
use std::path::{Path, PathBuf};

pub mod chart;
pub mod document;
pub mod error;
pub mod table;
pub mod viewer;

pub use chart::{ChartInput, chart_figure, chart_html};
pub use error::RenderError;
pub use table::{console_table, table_html};
pub use viewer::open_in_viewer;

/// Renders the market chart to `path`.
pub fn render_chart(input: &ChartInput<'_>, path: &Path) -> Result<PathBuf, RenderError> {
    let html = chart_html(input)?;
    document::write_document(path, &html)
}

/// Renders the validation table to `path`.
pub fn render_table(
    report: &ValidationReport,
    title: &str,
    path: &Path,
) -> Result<PathBuf, RenderError> {
    document::write_document(path, &table_html(report, title))
}

/// The chart's x-axis bounds, for log lines.
pub fn time_span(table: &RollingWindowTable) -> Option<(String, String)> {
    Some((
        table.first_timestamp()?.format("%Y-%m-%d").to_string(),
        table.last_timestamp()?.format("%Y-%m-%d").to_string(),
    ))
}
