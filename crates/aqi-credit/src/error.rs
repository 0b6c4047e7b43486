use crate::config::ConfigError;
use crate::providers::ClientSetupError;
use crate::quote::QuoteError;
use crate::telemetry::TelemetryError;

/// Startup and command-line failures. HTTP handlers report [`QuoteError`]
/// through the quote router's own status mapping instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("upstream client error: {0}")]
    Upstream(#[from] ClientSetupError),
    #[error("quote error: {0}")]
    Quote(#[from] QuoteError),
}
