//! # Driftwatch Analytics
//!
//! The numerical core of the pipeline: turning raw samples into a smoothed,
//! truncated table, and standardising that table's columns.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** This crate has no knowledge of external systems. It depends only
//!   on `core-types`. "Now" is always passed in, never read from the clock.
//! - **Stage per function:** `transform` produces a `RollingWindowTable`; `zscores` and
//!   `summarize` read it. Each stage can be tested on its own.
//!
//! ## Public API
//!
//! - `SeriesTable` / `RollingWindowTable`: the time-indexed tables.
//! - `transform`, `cutoff_for`: the transform stage.
//! - `ZScoreSeries`, `zscores`, `column_zscore`: the statistics stage.
//! - `ColumnSummary`, `summarize`: descriptive figures for logs and the console.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod statistics;
pub mod summary;
pub mod transformer;

// Re-export the key components to create a clean, public-facing API.
pub use error::AnalyticsError;
pub use statistics::{ZScoreSeries, column_zscore, zscores};
pub use summary::{ColumnSummary, summarize};
pub use transformer::{Row, RollingWindowTable, SeriesTable, cutoff_for, transform};
