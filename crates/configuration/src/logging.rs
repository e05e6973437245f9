use crate::error::ConfigError;
use crate::settings::LoggingParams;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global tracing subscriber for the binary.
///
/// Events go to stderr, and additionally to a daily rolling file when
/// `params.directory` is set. The returned guard must be held for the lifetime of
/// the program so buffered file output is flushed on exit.
pub fn init_tracing(params: &LoggingParams) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&params.level))
        .map_err(|e| ConfigError::Logging(format!("invalid log level '{}': {e}", params.level)))?;

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match &params.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "equilens.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()
                .map_err(|e| ConfigError::Logging(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
                .map_err(|e| ConfigError::Logging(e.to_string()))?;
            Ok(None)
        }
    }
}
