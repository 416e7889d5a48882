use serde::{Deserialize, Serialize};
use std::fmt;

/// The value columns carried through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Price,
    Volume,
}

impl Column {
    /// Every column, in report order.
    pub const ALL: [Column; 2] = [Column::Price, Column::Volume];

    /// The human-readable label used in charts and tables.
    pub fn label(&self) -> &'static str {
        match self {
            Column::Price => "Spot Price",
            Column::Volume => "Total Volume",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Price => write!(f, "Price"),
            Column::Volume => write!(f, "Volume"),
        }
    }
}

/// The outcome of a single data-quality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Maps a boolean predicate result onto a verdict.
    pub fn from_passed(passed: bool) -> Self {
        if passed { Verdict::Pass } else { Verdict::Fail }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "Pass"),
            Verdict::Fail => write!(f, "Fail"),
        }
    }
}

/// The standard-deviation estimator used when standardising a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdDevEstimator {
    /// Unbiased estimator, divides by `n - 1`.
    #[default]
    Sample,
    /// Divides by `n`.
    Population,
}

impl StdDevEstimator {
    /// The delta degrees of freedom subtracted from `n`.
    pub fn ddof(&self) -> usize {
        match self {
            StdDevEstimator::Sample => 1,
            StdDevEstimator::Population => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_follows_predicate() {
        assert_eq!(Verdict::from_passed(true), Verdict::Pass);
        assert_eq!(Verdict::from_passed(false), Verdict::Fail);
        assert!(!Verdict::Fail.is_pass());
    }

    #[test]
    fn columns_are_listed_price_first() {
        assert_eq!(Column::ALL, [Column::Price, Column::Volume]);
        assert_eq!(Column::Volume.label(), "Total Volume");
        assert_eq!(Column::Price.to_string(), "Price");
    }

    #[test]
    fn sample_estimator_is_the_default() {
        assert_eq!(StdDevEstimator::default(), StdDevEstimator::Sample);
        assert_eq!(StdDevEstimator::Sample.ddof(), 1);
        assert_eq!(StdDevEstimator::Population.ddof(), 0);
    }
}
