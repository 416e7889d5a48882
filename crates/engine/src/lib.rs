//! Runs the report pipeline: fetch -> transform -> (statistics, validation) -> render.
//!
//! Every stage takes explicit inputs and returns an explicit value; the `Pipeline` only
//! carries the settings.

use analytics::{AnalyticsError, ColumnSummary, RollingWindowTable, SeriesTable, ZScoreSeries};
use api_client::MarketDataSource;
use chrono::{DateTime, Duration, Utc};
use configuration::Settings;
use core_types::{Column, Sample};
use data_quality::{ValidationReport, Validator};
use renderer::ChartInput;
use std::path::PathBuf;

pub mod error;

pub use error::PipelineError;

/// Everything one run computes, before anything is written.
#[derive(Debug)]
pub struct PipelineOutput {
    pub asset: String,
    pub vs_currency: String,
    /// Samples delivered by the source, before de-duplication.
    pub fetched: usize,
    pub cutoff: DateTime<Utc>,
    pub table: RollingWindowTable,
    /// One entry per column; a failed column does not stop the other.
    pub zscores: Vec<(Column, Result<ZScoreSeries, AnalyticsError>)>,
    /// `None` when validation is disabled.
    pub validation: Option<ValidationReport>,
    pub summaries: Vec<ColumnSummary>,
}

impl PipelineOutput {
    pub fn zscore(&self, column: Column) -> Option<&Result<ZScoreSeries, AnalyticsError>> {
        self.zscores
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, result)| result)
    }
}

/// Paths of the documents a render wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifacts {
    pub chart: PathBuf,
    pub table: Option<PathBuf>,
}

impl RenderedArtifacts {
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.chart).chain(self.table.iter())
    }
}

pub struct Pipeline {
    settings: Settings,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fetches the configured asset's full history.
    pub async fn fetch(&self, source: &dyn MarketDataSource) -> Result<Vec<Sample>, PipelineError> {
        let src = &self.settings.source;
        tracing::info!(
            asset = %src.asset,
            currency = %src.vs_currency,
            source = %source.describe(),
            "Fetching market chart."
        );
        let samples = source
            .fetch_market_chart(&src.asset, &src.vs_currency)
            .await?;
        tracing::info!(samples = samples.len(), "Fetched market chart.");
        Ok(samples)
    }

    /// Runs every computing stage over already-fetched samples.
    ///
    /// `now` anchors the trailing-months cutoff.
    pub fn process(
        &self,
        samples: &[Sample],
        now: DateTime<Utc>,
    ) -> Result<PipelineOutput, PipelineError> {
        let cfg = &self.settings.pipeline;
        let window = Duration::days(i64::from(cfg.window_days));

        let cutoff = analytics::cutoff_for(now, cfg.months_back);
        let table = analytics::transform(samples, window, cfg.months_back, now)?;
        if table.is_empty() {
            return Err(PipelineError::EmptyWindow {
                cutoff,
                months: cfg.months_back,
                total_rows: SeriesTable::from_samples(samples).len(),
            });
        }
        tracing::info!(rows = table.len(), %cutoff, "Built rolling window table.");

        let zscores = analytics::zscores(&table, cfg.stddev_estimator);
        for (column, result) in &zscores {
            if let Err(e) = result {
                tracing::warn!(%column, error = %e, "Z-score unavailable for column.");
            }
        }

        let validation = if cfg.validate {
            let report = Validator::default().run(&table)?;
            for failure in report.failures() {
                tracing::warn!(
                    check = failure.check.name(),
                    column = %failure.column,
                    "Data-quality check failed."
                );
            }
            Some(report)
        } else {
            tracing::debug!("Validation disabled; skipping data-quality checks.");
            None
        };

        let summaries = analytics::summarize(&table);
        for s in &summaries {
            tracing::info!(
                column = %s.column,
                rows = s.count,
                missing = s.missing,
                min = ?s.min,
                max = ?s.max,
                latest = ?s.latest,
                "Column summary."
            );
        }

        Ok(PipelineOutput {
            asset: self.settings.source.asset.clone(),
            vs_currency: self.settings.source.vs_currency.clone(),
            fetched: samples.len(),
            cutoff,
            table,
            zscores,
            validation,
            summaries,
        })
    }

    /// Fetches and processes in one go.
    pub async fn run(
        &self,
        source: &dyn MarketDataSource,
        now: DateTime<Utc>,
    ) -> Result<PipelineOutput, PipelineError> {
        let samples = self.fetch(source).await?;
        self.process(&samples, now)
    }

    /// Writes the chart and, when validation ran, the table.
    pub fn render(&self, output: &PipelineOutput) -> Result<RenderedArtifacts, PipelineError> {
        let out = &self.settings.output;

        let input = ChartInput {
            asset: &output.asset,
            window_days: self.settings.pipeline.window_days,
            table: &output.table,
            zscores: &output.zscores,
        };
        if let Some((from, to)) = renderer::time_span(&output.table) {
            tracing::info!(%from, %to, "Rendering chart.");
        }
        let chart = renderer::render_chart(&input, &out.chart_path())?;

        let table = match &output.validation {
            Some(report) => {
                let title = format!(
                    "{} ({}) Data Quality Validation",
                    output.asset,
                    output.vs_currency.to_uppercase()
                );
                Some(renderer::render_table(report, &title, &out.table_path())?)
            }
            None => None,
        };

        Ok(RenderedArtifacts { chart, table })
    }

    /// Opens the written documents when the settings ask for it. A viewer that cannot
    /// be launched is logged, not fatal.
    pub fn open(&self, artifacts: &RenderedArtifacts) {
        if !self.settings.output.open {
            return;
        }
        for path in artifacts.paths() {
            if let Err(e) = renderer::open_in_viewer(path) {
                tracing::warn!(error = %e, "Could not open document.");
            }
        }
    }
}
