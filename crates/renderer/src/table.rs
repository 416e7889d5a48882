//! The data-quality report, as an HTML document and as a terminal table.

use crate::document::escape_html;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use core_types::Verdict;
use data_quality::ValidationReport;

const HEADERS: [&str; 3] = ["Check", "Price", "Volume"];

fn verdict_cell(verdict: Verdict) -> Cell {
    let color = if verdict.is_pass() { Color::Green } else { Color::Red };
    Cell::new(verdict).fg(color)
}

/// The report as a terminal table.
pub fn console_table(report: &ValidationReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(HEADERS);

    for row in report.rows() {
        table.add_row(vec![
            Cell::new(row.check.name()),
            verdict_cell(row.price),
            verdict_cell(row.volume),
        ]);
    }
    table
}

/// The report as a standalone HTML document.
pub fn table_html(report: &ValidationReport, title: &str) -> String {
    let header: String = HEADERS.iter().map(|h| format!("<th>{}</th>", h)).collect();
    let body: String = report
        .rows()
        .iter()
        .map(|row| {
            format!(
                "<tr><td>{}</td>{}{}</tr>\n",
                escape_html(row.check.name()),
                verdict_td(row.price),
                verdict_td(row.volume)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
table {{ border-collapse: collapse; }}
th, td {{ border: 1px solid #999; padding: 0.4em 1em; text-align: left; }}
th {{ background: #eee; }}
td.pass {{ color: #1a7f37; }}
td.fail {{ color: #cf222e; font-weight: bold; }}
</style>
</head>
<body>
<h1>{title}</h1>
<table>
<thead><tr>{header}</tr></thead>
<tbody>
{body}</tbody>
</table>
</body>
</html>
"#,
        title = escape_html(title),
        header = header,
        body = body,
    )
}

fn verdict_td(verdict: Verdict) -> String {
    let class = if verdict.is_pass() { "pass" } else { "fail" };
    format!("<td class=\"{}\">{}</td>", class, verdict)
}
