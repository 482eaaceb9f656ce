//! Tracing setup for the therapy CLI
//!
//! Usage:
//!   therapy --debug serve             # Debug logging to stderr
//!   RUST_LOG=therapy_server=debug ... # Fine-grained log control
//!
//! Environment variables:
//!   RUST_LOG                          # Log filter (default: info)

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Enable debug logging (sets RUST_LOG=debug if not already set)
    pub debug: bool,
}

/// Initialize console tracing. Output goes to stderr so command output on
/// stdout stays clean.
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = if config.debug {
        // Debug mode: set debug level unless RUST_LOG is explicitly set
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
