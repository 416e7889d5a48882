use core_types::Verdict;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// The fixed set of whole-column data-quality checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Check {
    DataType,
    Range,
    NullValue,
    DuplicateValue,
    /// Same predicate as `NullValue`. Kept as its own row in the report.
    Consistency,
}

impl Check {
    /// Every check, in report order.
    pub const ALL: [Check; 5] = [
        Check::DataType,
        Check::Range,
        Check::NullValue,
        Check::DuplicateValue,
        Check::Consistency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Check::DataType => "Data Type Validation",
            Check::Range => "Range Validation",
            Check::NullValue => "Null Value Validation",
            Check::DuplicateValue => "Duplicate Value Validation",
            Check::Consistency => "Consistency Validation",
        }
    }

    /// Evaluates the check over a whole column.
    pub fn evaluate(&self, values: &[Option<f64>]) -> Verdict {
        let passed = match self {
            Check::DataType => all_numeric(values),
            Check::Range => all_non_negative(values),
            Check::NullValue | Check::Consistency => no_missing(values),
            Check::DuplicateValue => no_duplicates(values),
        };
        Verdict::from_passed(passed)
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every present value is a finite number.
pub fn all_numeric(values: &[Option<f64>]) -> bool {
    values.iter().flatten().all(|v| v.is_finite())
}

/// No present value is below zero.
pub fn all_non_negative(values: &[Option<f64>]) -> bool {
    values.iter().flatten().all(|v| *v >= 0.0)
}

pub fn no_missing(values: &[Option<f64>]) -> bool {
    values.iter().all(Option::is_some)
}

/// No two rows hold the same value. Two missing values count as equal, and so do
/// `0.0` and `-0.0`.
pub fn no_duplicates(values: &[Option<f64>]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v.map(canonical_bits)))
}

fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}
