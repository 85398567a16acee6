//! # Certificate Lifecycle
//!
//! Issuance, caching and rotation of mTLS identity certificates for mesh
//! workloads.
//!
//! ## Authorities
//!
//! Two authority references are tracked at any time:
//!
//! - the **signing** issuer signs every new certificate and supplies the
//!   trust domain appended to identity prefixes;
//! - the **validating** issuer is the additional root peers must trust while
//!   a changeover is in flight.
//!
//! When both are the same authority the trust bundle is that root alone;
//! otherwise it is the signing root followed by the validating root.
//!
//! ## Lifecycle
//!
//! ```text
//! issue_certificate(prefix) ──► cache hit? ──yes──► cached Arc<Certificate>
//!                                    │no
//!                                    ▼
//!                        signing backend ──► Certificate ──► cache
//!
//! rotor tick ──► expired entries ──► reissue ──► CertificateRotated event
//! ```

mod cache;
mod cert;
mod issuer;
mod manager;
mod pem;
mod rotor;
mod self_signed;
mod source;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::CertificateCache;
pub use cert::{Certificate, IssueOptions};
pub use issuer::{CertificateIssuer, IssuedCertificate, Issuer, TrustBundle};
pub use manager::Manager;
pub use pem::{CertificateChain, RootCertificate};
pub use rotor::{RotationSummary, Rotor};
pub use self_signed::SelfSignedIssuer;
pub use source::{IssuerSnapshot, IssuerSource};
pub use types::{CommonName, IssuerId, SecretString, SerialNumber};
