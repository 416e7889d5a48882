use core_types::StdDevEstimator;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its defaults, so an empty `config.toml` (or none at all)
/// reproduces the stock bitcoin/usd report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Where the market data comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// The CoinGecko asset identifier (e.g., "bitcoin").
    pub asset: String,
    /// The quote currency (e.g., "usd").
    pub vs_currency: String,
    /// Base URL of the CoinGecko v3 API.
    pub base_url: String,
    /// Upper bound on the single HTTP request, in seconds.
    pub timeout_secs: u64,
}

/// Parameters for the transform, statistics and validation stages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Only rows newer than this many calendar months before "now" are kept.
    pub months_back: u32,
    /// Width of the trailing rolling-mean window, in days.
    pub window_days: u32,
    /// Whether the data-quality validator and its table run at all.
    pub validate: bool,
    pub stddev_estimator: StdDevEstimator,
}

/// Where the rendered artifacts are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub chart_file: String,
    pub table_file: String,
    /// Open the written documents with the platform viewer.
    pub open: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            asset: "bitcoin".to_string(),
            vs_currency: "usd".to_string(),
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            months_back: 75,
            window_days: 7,
            validate: true,
            stddev_estimator: StdDevEstimator::Sample,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            chart_file: "chart.html".to_string(),
            table_file: "validation.html".to_string(),
            open: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "driftwatch.log".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn chart_path(&self) -> PathBuf {
        self.dir.join(&self.chart_file)
    }

    pub fn table_path(&self) -> PathBuf {
        self.dir.join(&self.table_file)
    }
}

/// Values supplied on the command line. Each one, when present, wins over
/// the file and environment layers.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct CliOverrides {
    /// The CoinGecko asset identifier (e.g., "bitcoin", "ethereum").
    #[cfg_attr(feature = "clap", arg(long))]
    pub asset: Option<String>,

    /// The quote currency (e.g., "usd", "eur").
    #[cfg_attr(feature = "clap", arg(long = "currency"))]
    pub vs_currency: Option<String>,

    /// Keep only the trailing N months of data.
    #[cfg_attr(feature = "clap", arg(long = "months"))]
    pub months_back: Option<u32>,

    /// Width of the rolling-mean window in days.
    #[cfg_attr(feature = "clap", arg(long))]
    pub window_days: Option<u32>,

    /// Directory the chart and table documents are written to.
    #[cfg_attr(feature = "clap", arg(long))]
    pub out_dir: Option<PathBuf>,

    /// Skip the data-quality validator and its table.
    #[cfg_attr(feature = "clap", arg(long))]
    pub no_validation: bool,

    /// Open the written documents once rendering finishes.
    #[cfg_attr(feature = "clap", arg(long))]
    pub open: bool,
}

impl Settings {
    /// Layers command-line values over the loaded settings.
    pub fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(asset) = &overrides.asset {
            self.source.asset = asset.clone();
        }
        if let Some(currency) = &overrides.vs_currency {
            self.source.vs_currency = currency.clone();
        }
        if let Some(months) = overrides.months_back {
            self.pipeline.months_back = months;
        }
        if let Some(days) = overrides.window_days {
            self.pipeline.window_days = days;
        }
        if let Some(dir) = &overrides.out_dir {
            self.output.dir = dir.clone();
        }
        if overrides.no_validation {
            self.pipeline.validate = false;
        }
        if overrides.open {
            self.output.open = true;
        }
    }
}
