use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid risk parameters: {0}")]
    Config(#[from] configuration::error::ConfigError),

    #[error("Beta estimator could not be built: {0}")]
    Risk(#[from] risk::RiskError),
}
