//! # Meshcert
//!
//! Meshcert manages the lifecycle of mTLS identity certificates for service
//! mesh workloads: issuance through a pluggable certificate authority, caching
//! per identity, dual-authority trust bundles during root changeovers, and
//! background rotation of expired certificates.
//!
//! ## Architecture
//!
//! ```text
//! IssuerSource (signing, validating) ──► Manager ──► CertificateCache
//!                                          │  ▲
//!                                   Rotor ─┘  └─ callers (issue / release / list)
//!                                     │
//!                                     ▼
//!                          Broker ── CertificateRotated ──► subscribers
//! ```
//!
//! ## Core Components
//!
//! - **Manager**: cache lookups, issuance and trust bundle assembly
//! - **Rotor**: periodic reissue of expired cache entries
//! - **IssuerSource**: atomically swappable signing/validating authorities
//! - **Broker**: topic-keyed fan-out of rotation announcements
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use meshcert::{
//!     Broker, IssueOptions, IssuerSource, Manager, ManagerConfig, Result, SelfSignedIssuer,
//! };
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ManagerConfig::from_env()?;
//!     let ca = SelfSignedIssuer::new("mesh root")?.into_issuer("ca-1", "cluster.local");
//!     let broker = Arc::new(Broker::new(config.certificates.event_channel_capacity));
//!     let manager = Arc::new(Manager::from_config(
//!         Arc::new(IssuerSource::single(ca)),
//!         &config.certificates,
//!         broker.clone(),
//!     )?);
//!
//!     let stop = CancellationToken::new();
//!     manager.start(config.certificates.rotation_check_interval(), stop.clone());
//!
//!     let cert = manager.issue_certificate("bookstore.default", IssueOptions::default()).await?;
//!     tracing::info!(common_name = %cert.common_name(), "issued");
//!     stop.cancel();
//!     Ok(())
//! }
//! ```

pub mod certificate;
pub mod config;
pub mod errors;
pub mod messaging;
pub mod observability;

// Re-export commonly used types and traits
pub use certificate::{
    Certificate, CertificateIssuer, CommonName, IssueOptions, IssuedCertificate, Issuer,
    IssuerId, IssuerSource, Manager, RootCertificate, SelfSignedIssuer, SerialNumber,
    TrustBundle,
};
pub use config::{CertificateConfig, ManagerConfig, ObservabilityConfig};
pub use errors::{CertificateError, IssuerError, Result};
pub use messaging::{Announcement, Broker, CertificateRotated, Event, Publisher};
pub use observability::init_observability;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
