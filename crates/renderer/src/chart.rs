//! The three-panel market chart as a plotly.js figure.

use crate::document::{PLOTLY_CDN, escape_html, script_safe_json};
use crate::error::RenderError;
use analytics::{AnalyticsError, RollingWindowTable, ZScoreSeries};
use chrono::{DateTime, Utc};
use core_types::Column;
use serde_json::{Value, json};

/// Outlier thresholds drawn on the Z-score panel.
pub const ZSCORE_BANDS: [f64; 2] = [-2.0, 2.0];

/// Everything the chart needs, borrowed from the pipeline output.
pub struct ChartInput<'a> {
    pub asset: &'a str,
    pub window_days: u32,
    pub table: &'a RollingWindowTable,
    pub zscores: &'a [(Column, Result<ZScoreSeries, AnalyticsError>)],
}

impl ChartInput<'_> {
    pub fn title(&self) -> String {
        format!(
            "{} Market Data ({} day moving averages) - Spot Price, Total Volume, and Z-scores",
            display_name(self.asset),
            self.window_days
        )
    }
}

/// "bitcoin" -> "Bitcoin", "usd-coin" -> "Usd-coin".
fn display_name(asset: &str) -> String {
    let mut chars = asset.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn axis_time(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A horizontal line spanning the whole table on the given subplot.
fn hline(row: usize, x0: &str, x1: &str, y: f64, color: &str, dash: &str) -> Value {
    let suffix = if row == 1 { String::new() } else { row.to_string() };
    json!({
        "type": "line",
        "xref": format!("x{}", suffix),
        "yref": format!("y{}", suffix),
        "x0": x0,
        "x1": x1,
        "y0": y,
        "y1": y,
        "line": { "color": color, "width": 1, "dash": dash },
    })
}

/// Builds the figure: rolling price, rolling volume with its latest value marked, and
/// both Z-scores against the fixed bands.
pub fn chart_figure(input: &ChartInput<'_>) -> Result<Value, RenderError> {
    let table = input.table;
    let (Some(first), Some(last)) = (table.first_timestamp(), table.last_timestamp()) else {
        return Err(RenderError::EmptyTable);
    };
    let x: Vec<String> = table.timestamps().iter().map(axis_time).collect();
    let (x0, x1) = (axis_time(&first), axis_time(&last));

    let mut traces = vec![
        json!({
            "type": "scatter",
            "mode": "lines",
            "name": Column::Price.label(),
            "x": x,
            "y": table.column(Column::Price),
            "xaxis": "x",
            "yaxis": "y",
        }),
        json!({
            "type": "scatter",
            "mode": "lines",
            "name": Column::Volume.label(),
            "x": x,
            "y": table.column(Column::Volume),
            "xaxis": "x2",
            "yaxis": "y2",
        }),
    ];

    let mut shapes = Vec::new();
    if let Some(latest_volume) = table.latest(Column::Volume) {
        shapes.push(hline(2, &x0, &x1, latest_volume, "red", "dash"));
    }
    shapes.push(hline(3, &x0, &x1, ZSCORE_BANDS[1], "black", "dash"));
    shapes.push(hline(3, &x0, &x1, ZSCORE_BANDS[0], "black", "dash"));
    shapes.push(hline(3, &x0, &x1, 0.0, "black", "solid"));

    let mut annotations = Vec::new();
    for (column, result) in input.zscores {
        match result {
            Ok(series) => traces.push(json!({
                "type": "scatter",
                "mode": "lines",
                "name": format!("{} Z-score", column.label()),
                "x": series.timestamps.iter().map(axis_time).collect::<Vec<_>>(),
                "y": series.values,
                "xaxis": "x3",
                "yaxis": "y3",
            })),
            Err(e) => {
                tracing::warn!(%column, error = %e, "Omitting Z-score trace from chart.");
                let y = 0.27 - 0.04 * annotations.len() as f64;
                annotations.push(json!({
                    "text": format!("{} Z-score unavailable: {}", column.label(), e),
                    "xref": "paper",
                    "yref": "paper",
                    "x": 0.0,
                    "y": y,
                    "xanchor": "left",
                    "showarrow": false,
                    "font": { "color": "red" },
                }));
            }
        }
    }

    // Three rows, 0.1 vertical spacing, shared time axis anchored on the bottom row.
    let layout = json!({
        "title": { "text": input.title() },
        "showlegend": true,
        "xaxis": { "anchor": "y", "matches": "x3", "showticklabels": false },
        "xaxis2": { "anchor": "y2", "matches": "x3", "showticklabels": false },
        "xaxis3": { "anchor": "y3", "rangeslider": { "visible": false } },
        "yaxis": { "domain": [0.7333, 1.0], "title": { "text": Column::Price.label() } },
        "yaxis2": { "domain": [0.3667, 0.6333], "title": { "text": Column::Volume.label() } },
        "yaxis3": { "domain": [0.0, 0.2667], "title": { "text": "Z-score" } },
        "shapes": shapes,
        "annotations": annotations,
    });

    Ok(json!({ "data": traces, "layout": layout }))
}

/// A standalone HTML document that draws the chart with plotly.js.
pub fn chart_html(input: &ChartInput<'_>) -> Result<String, RenderError> {
    let figure = serde_json::to_string(&chart_figure(input)?)?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}" charset="utf-8"></script>
</head>
<body>
<div id="chart" style="width:100%;height:95vh;"></div>
<script>
const figure = {figure};
Plotly.newPlot("chart", figure.data, figure.layout, {{ responsive: true }});
</script>
</body>
</html>
"#,
        title = escape_html(&input.title()),
        cdn = PLOTLY_CDN,
        figure = script_safe_json(&figure),
    ))
}
