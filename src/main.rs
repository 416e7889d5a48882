use anyhow::Context;
use api_client::{CoinGeckoClient, FileSource, MarketDataSource};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use configuration::{CliOverrides, Settings};
use engine::{Pipeline, PipelineError, PipelineOutput};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

/// The main entry point for the driftwatch market-data report.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A .env file is optional; it only feeds DRIFTWATCH__* overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Run failed.");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Smoothed price/volume history, Z-scores and data-quality checks for a CoinGecko asset.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the chart and, unless disabled, the validation table.
    Report(ReportArgs),
    /// Run the data-quality checks and print the table to the console only.
    Validate(ValidateArgs),
}

#[derive(Parser)]
struct ReportArgs {
    #[command(flatten)]
    overrides: CliOverrides,

    #[command(flatten)]
    input: InputArgs,
}

#[derive(Parser)]
struct ValidateArgs {
    /// The CoinGecko asset identifier (e.g., "bitcoin", "ethereum").
    #[arg(long)]
    asset: Option<String>,

    /// The quote currency (e.g., "usd", "eur").
    #[arg(long)]
    currency: Option<String>,

    /// Keep only the trailing N months of data.
    #[arg(long)]
    months: Option<u32>,

    #[command(flatten)]
    input: InputArgs,
}

impl ValidateArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            asset: self.asset.clone(),
            vs_currency: self.currency.clone(),
            months_back: self.months,
            ..Default::default()
        }
    }
}

#[derive(Args)]
struct InputArgs {
    /// Read a saved market_chart JSON response instead of calling the API.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Path to a TOML configuration file (defaults to ./config.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Report(args) => {
            let (settings, _guard) = prepare(&args.input, &args.overrides)?;
            handle_report(settings, args.input.input.as_deref()).await
        }
        Commands::Validate(args) => {
            let (mut settings, _guard) = prepare(&args.input, &args.overrides())?;
            // The console table is the whole point of this command.
            settings.pipeline.validate = true;
            handle_validate(settings, args.input.input.as_deref()).await
        }
    }
}

/// Loads and validates the layered settings, then installs logging.
fn prepare(
    input: &InputArgs,
    overrides: &CliOverrides,
) -> anyhow::Result<(Settings, Option<configuration::WorkerGuard>)> {
    let mut settings = configuration::load_config(input.config.as_deref())
        .context("Failed to load configuration")?;
    settings.apply_overrides(overrides);
    configuration::validate(&settings).context("Invalid configuration")?;

    let guard =
        configuration::init_tracing(&settings.logging).context("Failed to initialise logging")?;
    Ok((settings, guard))
}

async fn handle_report(settings: Settings, input: Option<&Path>) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(settings);
    let output = execute(&pipeline, input).await?;

    if let Some(report) = &output.validation {
        println!("{}", renderer::console_table(report));
    }
    print_summaries(&output);

    let artifacts = pipeline.render(&output).map_err(stage_error)?;
    for path in artifacts.paths() {
        println!("Wrote {}", path.display());
    }
    pipeline.open(&artifacts);
    Ok(())
}

async fn handle_validate(settings: Settings, input: Option<&Path>) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(settings);
    let output = execute(&pipeline, input).await?;

    if let Some(report) = &output.validation {
        println!("{}", renderer::console_table(report));
        if !report.all_passed() {
            println!("{} check(s) failed.", report.failures().count());
        }
    }
    Ok(())
}

/// Fetches behind a spinner, then runs the computing stages.
async fn execute(pipeline: &Pipeline, input: Option<&Path>) -> anyhow::Result<PipelineOutput> {
    let source: Box<dyn MarketDataSource> = match input {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(
            CoinGeckoClient::new(&pipeline.settings().source)
                .context("Failed to build the HTTP client")?,
        ),
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Fetching {}...", source.describe()));

    let fetched = pipeline.fetch(source.as_ref()).await;
    spinner.finish_and_clear();
    let samples = fetched.map_err(stage_error)?;

    pipeline.process(&samples, Utc::now()).map_err(stage_error)
}

fn print_summaries(output: &PipelineOutput) {
    println!(
        "{} rows since {} ({} fetched)",
        output.table.len(),
        output.cutoff.format("%Y-%m-%d"),
        output.fetched
    );
    for s in &output.summaries {
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
        println!(
            "  {:<12} min {:>18}  max {:>18}  latest {:>18}  missing {}",
            s.column.label(),
            fmt(s.min),
            fmt(s.max),
            fmt(s.latest),
            s.missing
        );
    }
}

/// Attaches the failing stage name to a pipeline error.
fn stage_error(e: PipelineError) -> anyhow::Error {
    let stage = e.stage();
    anyhow::Error::new(e).context(format!("Pipeline failed during {}", stage))
}
