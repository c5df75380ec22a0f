//! Logging setup for the `pipeql` binary
//!
//! Everything goes to stderr so stdout carries only the converted output.

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,

    /// Whether to include file/line information in logs
    pub include_location: bool,
}

impl LoggingConfig {
    pub fn new(default_filter: impl Into<String>) -> Self {
        Self {
            default_filter: default_filter.into(),
            include_location: cfg!(debug_assertions),
        }
    }

    /// Configuration for `--verbose`
    pub fn verbose() -> Self {
        Self {
            default_filter: "debug".to_string(),
            include_location: true,
        }
    }
}

/// Initialize the logging system with the given configuration
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    // RUST_LOG environment variable takes precedence over default filter
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).try_init()?;

    tracing::debug!(filter = %config.default_filter, "Logging system initialized");
    Ok(())
}
