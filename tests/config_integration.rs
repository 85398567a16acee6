//! Integration tests for configuration management
//!
//! These tests validate that the configuration system reads `MESHCERT_*`
//! environment variables and that the resulting values drive the manager.

use meshcert::{Broker, IssuerSource, Manager, ManagerConfig, Result, SelfSignedIssuer};
use std::env;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Use a mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const VARS: [&str; 4] = [
    "MESHCERT_SERVICE_CERT_VALIDITY_MINUTES",
    "MESHCERT_ROTATION_CHECK_INTERVAL_SECONDS",
    "MESHCERT_EVENT_CHANNEL_CAPACITY",
    "MESHCERT_LOG_LEVEL",
];

fn restore(saved: Vec<(&str, Option<String>)>) {
    for (name, value) in saved {
        match value {
            Some(value) => env::set_var(name, value),
            None => env::remove_var(name),
        }
    }
}

/// Test that configuration properly reads environment variables
#[test]
fn test_config_environment_integration() -> Result<()> {
    let _guard = ENV_MUTEX.lock().unwrap();
    let saved: Vec<_> = VARS.iter().map(|name| (*name, env::var(name).ok())).collect();

    env::set_var("MESHCERT_SERVICE_CERT_VALIDITY_MINUTES", "90");
    env::set_var("MESHCERT_ROTATION_CHECK_INTERVAL_SECONDS", "30");
    env::set_var("MESHCERT_EVENT_CHANNEL_CAPACITY", "8");
    env::set_var("MESHCERT_LOG_LEVEL", "debug");

    let config = ManagerConfig::from_env();
    restore(saved);
    let config = config?;

    assert_eq!(config.certificates.service_cert_validity(), chrono::Duration::minutes(90));
    assert_eq!(config.certificates.rotation_check_interval(), Duration::from_secs(30));
    assert_eq!(config.certificates.event_channel_capacity, 8);
    assert_eq!(config.observability.log_level, "debug");

    Ok(())
}

/// Test that malformed and out-of-range values are rejected
#[test]
fn test_config_rejects_invalid_values() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let saved: Vec<_> = VARS.iter().map(|name| (*name, env::var(name).ok())).collect();

    env::set_var("MESHCERT_ROTATION_CHECK_INTERVAL_SECONDS", "soon");
    let malformed = ManagerConfig::from_env();

    env::set_var("MESHCERT_ROTATION_CHECK_INTERVAL_SECONDS", "0");
    let out_of_range = ManagerConfig::from_env();

    restore(saved);
    assert!(malformed.is_err());
    assert!(out_of_range.is_err());
}

/// Test that the configured validity becomes the manager default
#[test]
fn test_manager_from_config() -> Result<()> {
    let _guard = ENV_MUTEX.lock().unwrap();
    let saved: Vec<_> = VARS.iter().map(|name| (*name, env::var(name).ok())).collect();

    env::set_var("MESHCERT_SERVICE_CERT_VALIDITY_MINUTES", "15");
    let config = ManagerConfig::from_env();
    restore(saved);
    let config = config?;

    let ca = SelfSignedIssuer::new("config root")?.into_issuer("ca", "cluster.local");
    let broker = Arc::new(Broker::new(config.certificates.event_channel_capacity));
    let manager =
        Manager::from_config(Arc::new(IssuerSource::single(ca)), &config.certificates, broker)?;

    assert_eq!(manager.service_cert_validity(), chrono::Duration::minutes(15));
    Ok(())
}
