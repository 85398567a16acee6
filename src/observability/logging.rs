//! # Structured Logging
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` takes precedence over
//! the configured level; JSON output is available for log shippers.

use crate::config::{CertificateConfig, ObservabilityConfig};
use crate::errors::{CertificateError, Result};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install the global subscriber.
///
/// A subscriber that is already installed (integration tests, embedding
/// processes) is left in place.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            CertificateError::config(format!("Invalid log level '{}': {}", config.log_level, e))
        })?,
    };

    let installed = if config.json_logging {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder().with_env_filter(filter).json().finish(),
        )
    } else {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder().with_env_filter(filter).finish(),
        )
    };

    if installed.is_err() {
        // Subscriber already set elsewhere; ignore.
    }
    Ok(())
}

/// Log configuration at startup
pub fn log_config_info(config: &CertificateConfig) {
    tracing::info!(
        service_cert_validity_minutes = config.service_cert_validity_minutes,
        rotation_check_interval_seconds = config.rotation_check_interval_seconds,
        event_channel_capacity = config.event_channel_capacity,
        "Certificate manager configuration"
    );
}
