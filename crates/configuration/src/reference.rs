use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Raw, unvalidated reference tables as read from disk.
///
/// ```toml
/// [betas]
/// INFY = 0.85
///
/// [sectors]
/// INFY = "IT"
///
/// [sector_betas]
/// IT = 0.9
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReferenceTables {
    /// Precomputed beta per ticker code.
    pub betas: HashMap<String, f64>,
    /// Sector classification per ticker code.
    pub sectors: HashMap<String, String>,
    /// Explicit average beta per sector.
    pub sector_betas: HashMap<String, f64>,
}

/// Loads reference tables from a TOML or JSON file (format chosen by extension).
pub fn load_reference_tables(path: impl AsRef<Path>) -> Result<ReferenceTables, ConfigError> {
    let tables = config::Config::builder()
        .add_source(config::File::from(path.as_ref()))
        .build()?
        .try_deserialize::<ReferenceTables>()?;
    Ok(tables)
}

/// Parses reference tables from an in-memory TOML document.
pub fn reference_tables_from_toml(toml: &str) -> Result<ReferenceTables, ConfigError> {
    let tables = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<ReferenceTables>()?;
    Ok(tables)
}
