//! # Metrics Collection
//!
//! Certificate lifecycle metrics recorded through the `metrics` facade, with an
//! optional Prometheus exporter.

use crate::config::ObservabilityConfig;
use crate::errors::{CertificateError, Result};
use ::tracing::{info, warn};
use metrics::{counter, describe_counter, describe_gauge, gauge, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Metrics recorder for certificate issuance and rotation
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    /// Create a new metrics recorder instance
    pub fn new() -> Self {
        Self
    }

    /// Record a certificate signed by a backend
    pub fn record_certificate_issued(&self, issuer_id: &str) {
        let labels = [("issuer_id", issuer_id.to_string())];
        counter!("certificates_issued_total", &labels).increment(1);
    }

    /// Record a backend issuance failure
    pub fn record_issuance_failure(&self, issuer_id: &str) {
        let labels = [("issuer_id", issuer_id.to_string())];
        counter!("certificate_issuance_failures_total", &labels).increment(1);
    }

    /// Record a request served from the cache
    pub fn record_cache_hit(&self) {
        counter!("certificate_cache_hits_total").increment(1);
    }

    /// Record the outcome of one rotor reissue
    pub fn record_rotation(&self, success: bool) {
        if success {
            counter!("certificates_rotated_total").increment(1);
        } else {
            counter!("certificate_rotation_failures_total").increment(1);
        }
    }

    /// Update the cached certificate gauge
    pub fn update_cached_certificates(&self, count: usize) {
        gauge!("certificates_cached").set(count as f64);
    }

    /// Register metric descriptions with the installed recorder
    pub fn register_certificate_metrics(&self) {
        describe_counter!(
            "certificates_issued_total",
            Unit::Count,
            "Certificates signed by an issuer backend"
        );
        describe_counter!(
            "certificate_issuance_failures_total",
            Unit::Count,
            "Issuance attempts rejected by the signing issuer"
        );
        describe_counter!(
            "certificate_cache_hits_total",
            Unit::Count,
            "Issuance requests served from the certificate cache"
        );
        describe_counter!(
            "certificates_rotated_total",
            Unit::Count,
            "Expired certificates reissued by the rotor"
        );
        describe_counter!(
            "certificate_rotation_failures_total",
            Unit::Count,
            "Rotor reissue attempts that failed"
        );
        describe_gauge!("certificates_cached", Unit::Count, "Certificates currently cached");
    }
}

/// Initialize metrics collection and Prometheus exporter
pub fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    if !config.enable_metrics {
        return Ok(());
    }

    let metrics_addr = match config.metrics_bind_address() {
        Some(addr) => addr,
        None => {
            warn!("Metrics disabled: no bind address configured");
            return Ok(());
        }
    };

    let socket_addr: SocketAddr = metrics_addr.parse().map_err(|e| {
        CertificateError::config(format!("Invalid metrics bind address '{}': {}", metrics_addr, e))
    })?;

    PrometheusBuilder::new()
        .with_http_listener(socket_addr)
        .add_global_label("service", &config.service_name)
        .install()
        .map_err(|e| {
            CertificateError::config(format!("Failed to initialize metrics exporter: {}", e))
        })?;

    MetricsRecorder::new().register_certificate_metrics();

    info!(
        metrics_addr = %metrics_addr,
        service_name = %config.service_name,
        "Metrics collection initialized"
    );

    Ok(())
}
