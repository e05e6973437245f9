use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod reference;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use reference::{ReferenceTables, load_reference_tables, reference_tables_from_toml};
pub use settings::{
    BetaParams, Config, LensWeights, LoggingParams, RiskParams, ScoringParams, SignalThresholds,
};

/// Environment variables with this prefix override file settings. The prefix is
/// joined with the same `__` separator as the nested keys,
/// e.g. `EQUILENS__RISK__RISK_FREE_RATE=0.065`.
pub const ENV_PREFIX: &str = "EQUILENS";

/// Loads the application configuration from a TOML file plus environment overrides.
///
/// A missing file is not an error: every section has defaults. The merged result is
/// validated before it is returned.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    load_with_environment(path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn load_with_environment(
    path: impl AsRef<Path>,
    environment: config::Environment,
) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path.as_ref()).required(false))
        .add_source(environment)
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(
        path = %path.as_ref().display(),
        var_method = ?config.risk.var_method,
        "Configuration loaded"
    );
    Ok(config)
}

/// Parses and validates a configuration from an in-memory TOML document.
pub fn config_from_toml(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
