use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Invalid scoring configuration: {0}")]
    Config(#[from] configuration::error::ConfigError),

    #[error("Risk engine could not be built: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
}
