use crate::error::ValidationError;
use analytics::RollingWindowTable;
use core_types::{Column, Verdict};
use serde::Serialize;

pub mod checks;
pub mod error;

pub use checks::Check;

/// The verdict of one check on one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CheckResult {
    pub check: Check,
    pub column: Column,
    pub verdict: Verdict,
}

/// One line of the rendered report: a check and its verdict for each column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportRow {
    pub check: Check,
    pub price: Verdict,
    pub volume: Verdict,
}

/// Every `(check, column)` verdict of a single validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    results: Vec<CheckResult>,
}

impl ValidationReport {
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn verdict(&self, check: Check, column: Column) -> Option<Verdict> {
        self.results
            .iter()
            .find(|r| r.check == check && r.column == column)
            .map(|r| r.verdict)
    }

    /// One row per check, in the order the checks ran.
    pub fn rows(&self) -> Vec<ReportRow> {
        let mut checks: Vec<Check> = Vec::new();
        for result in &self.results {
            if !checks.contains(&result.check) {
                checks.push(result.check);
            }
        }

        checks
            .into_iter()
            .map(|check| ReportRow {
                check,
                price: self.verdict(check, Column::Price).unwrap_or(Verdict::Fail),
                volume: self.verdict(check, Column::Volume).unwrap_or(Verdict::Fail),
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.verdict.is_pass())
    }

    pub fn all_passed(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Runs a set of data-quality checks over a rolling window table.
pub struct Validator {
    checks: Vec<Check>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Check::ALL.to_vec())
    }
}

impl Validator {
    pub fn new(checks: Vec<Check>) -> Self {
        Self { checks }
    }

    /// Evaluates every check on every column. A failing check never stops the
    /// remaining ones.
    pub fn run(&self, table: &RollingWindowTable) -> Result<ValidationReport, ValidationError> {
        if table.is_empty() {
            return Err(ValidationError::EmptyTable);
        }

        let columns: Vec<(Column, Vec<Option<f64>>)> = Column::ALL
            .into_iter()
            .map(|column| (column, table.column(column)))
            .collect();

        let mut results = Vec::with_capacity(self.checks.len() * columns.len());
        for check in &self.checks {
            for (column, values) in &columns {
                let verdict = check.evaluate(values);
                tracing::debug!(check = check.name(), %column, %verdict, "Evaluated check.");
                results.push(CheckResult {
                    check: *check,
                    column: *column,
                    verdict,
                });
            }
        }

        Ok(ValidationReport { results })
    }
}

/// Runs the full, fixed set of checks.
pub fn validate(table: &RollingWindowTable) -> Result<ValidationReport, ValidationError> {
    Validator::default().run(table)
}
