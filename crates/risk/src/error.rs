use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Configuration error: {0}")]
    Config(#[from] configuration::error::ConfigError),

    #[error("Reference data is invalid: {0}")]
    InvalidReferenceData(String),
}
