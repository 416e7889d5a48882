use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::{WorkerGuard, init_tracing};
pub use settings::{
    CliOverrides, LoggingConfig, OutputConfig, PipelineConfig, Settings, SourceConfig,
};

/// Prefix for environment overrides, e.g. `DRIFTWATCH__PIPELINE__MONTHS_BACK=12`.
pub const ENV_PREFIX: &str = "DRIFTWATCH";

/// Loads the application configuration.
///
/// Layers, lowest precedence first: built-in defaults, the TOML file (`path`, or an
/// optional `config.toml` in the working directory), then `DRIFTWATCH__*` environment
/// variables. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        // An explicitly requested file must exist.
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    validate(&settings)?;

    Ok(settings)
}

/// Rejects settings the pipeline cannot run with.
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.source.asset.trim().is_empty() {
        return Err(ConfigError::ValidationError("source.asset must not be empty".into()));
    }
    if settings.source.vs_currency.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "source.vs_currency must not be empty".into(),
        ));
    }
    if settings.source.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "source.timeout_secs must be at least 1".into(),
        ));
    }
    if settings.pipeline.months_back == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.months_back must be at least 1".into(),
        ));
    }
    if settings.pipeline.window_days == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.window_days must be at least 1".into(),
        ));
    }
    Ok(())
}
