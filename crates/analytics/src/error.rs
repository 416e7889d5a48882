use core_types::Column;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Rolling window must be at least one day, got {0} days")]
    InvalidWindow(i64),

    #[error("The rolling window table is empty; nothing to standardise")]
    EmptyWindow,

    #[error("Column '{column}' has {count} missing values")]
    MissingValues { column: Column, count: usize },

    #[error("Column '{column}' contains non-finite values")]
    NonFiniteValues { column: Column },

    #[error("Column '{column}' has zero variance; its Z-score is undefined")]
    ZeroVariance { column: Column },
}
