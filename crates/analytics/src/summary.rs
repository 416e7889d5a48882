use crate::transformer::RollingWindowTable;
use core_types::Column;
use serde::Serialize;

/// Descriptive figures for one column of the reporting table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: Column,
    /// Rows with a value.
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// Value of the most recent row.
    pub latest: Option<f64>,
}

impl ColumnSummary {
    pub fn from_table(table: &RollingWindowTable, column: Column) -> Self {
        let values: Vec<f64> = table.column(column).into_iter().flatten().collect();
        let (min, max) = values.iter().fold((None, None), |(min, max), v| {
            (
                Some(min.map_or(*v, |m: f64| m.min(*v))),
                Some(max.map_or(*v, |m: f64| m.max(*v))),
            )
        });

        Self {
            column,
            count: values.len(),
            missing: table.len() - values.len(),
            min,
            max,
            mean: crate::statistics::mean(&values),
            latest: table.latest(column),
        }
    }
}

/// One summary per column, price first.
pub fn summarize(table: &RollingWindowTable) -> Vec<ColumnSummary> {
    Column::ALL
        .into_iter()
        .map(|column| ColumnSummary::from_table(table, column))
        .collect()
}
