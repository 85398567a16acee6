//! # Configuration Management
//!
//! Settings for certificate validity, rotor cadence, event buffering and
//! observability. Values come from defaults overridden by `MESHCERT_*`
//! environment variables, and are checked with `validator` before use.

pub mod settings;

pub use settings::{CertificateConfig, ManagerConfig, ObservabilityConfig};
