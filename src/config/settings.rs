//! # Configuration Settings
//!
//! Defines the configuration structure for the certificate manager.

use crate::errors::{CertificateError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main manager configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct ManagerConfig {
    /// Certificate lifecycle configuration
    #[validate(nested)]
    pub certificates: CertificateConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl ManagerConfig {
    /// Load configuration from `MESHCERT_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            certificates: CertificateConfig::from_env()?,
            observability: ObservabilityConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(CertificateError::from)?;
        Ok(())
    }
}

/// Certificate issuance and rotation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CertificateConfig {
    /// Default validity of service certificates in minutes
    #[validate(range(
        min = 1,
        max = 525600,
        message = "Certificate validity must be between 1 minute and 1 year"
    ))]
    pub service_cert_validity_minutes: i64,

    /// Interval between rotor scans in seconds
    #[validate(range(
        min = 1,
        max = 86400,
        message = "Rotation check interval must be between 1 second and 24 hours"
    ))]
    pub rotation_check_interval_seconds: u64,

    /// Buffered announcements per topic before slow subscribers lag
    #[validate(range(
        min = 1,
        max = 65536,
        message = "Event channel capacity must be between 1 and 65536"
    ))]
    pub event_channel_capacity: usize,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            service_cert_validity_minutes: 24 * 60,
            rotation_check_interval_seconds: 5,
            event_channel_capacity: 128,
        }
    }
}

impl CertificateConfig {
    /// Default validity as a signed duration
    pub fn service_cert_validity(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.service_cert_validity_minutes)
    }

    /// Rotor interval as Duration
    pub fn rotation_check_interval(&self) -> Duration {
        Duration::from_secs(self.rotation_check_interval_seconds)
    }

    /// Create CertificateConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let service_cert_validity_minutes = parse_env(
            "MESHCERT_SERVICE_CERT_VALIDITY_MINUTES",
            defaults.service_cert_validity_minutes,
        )?;
        let rotation_check_interval_seconds = parse_env(
            "MESHCERT_ROTATION_CHECK_INTERVAL_SECONDS",
            defaults.rotation_check_interval_seconds,
        )?;
        let event_channel_capacity =
            parse_env("MESHCERT_EVENT_CHANNEL_CAPACITY", defaults.event_channel_capacity)?;

        Ok(Self {
            service_cert_validity_minutes,
            rotation_check_interval_seconds,
            event_channel_capacity,
        })
    }
}

/// Observability configuration for logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Enable metrics collection
    pub enable_metrics: bool,

    /// Metrics server port (0 = disabled)
    pub metrics_port: u16,

    /// Service name attached to metrics
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            enable_metrics: false,
            metrics_port: 9090,
            service_name: "meshcert".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

impl ObservabilityConfig {
    /// Get metrics bind address (None if disabled)
    pub fn metrics_bind_address(&self) -> Option<String> {
        if self.metrics_port == 0 {
            None
        } else {
            Some(format!("0.0.0.0:{}", self.metrics_port))
        }
    }

    /// Create ObservabilityConfig from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enable_metrics = std::env::var("MESHCERT_ENABLE_METRICS")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(defaults.enable_metrics);

        let metrics_port = std::env::var("MESHCERT_METRICS_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(defaults.metrics_port);

        let service_name =
            std::env::var("MESHCERT_SERVICE_NAME").unwrap_or(defaults.service_name);

        let log_level = std::env::var("MESHCERT_LOG_LEVEL").unwrap_or(defaults.log_level);

        let json_logging = std::env::var("MESHCERT_JSON_LOGGING")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(defaults.json_logging);

        Self { enable_metrics, metrics_port, service_name, log_level, json_logging }
    }
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|e| CertificateError::config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
