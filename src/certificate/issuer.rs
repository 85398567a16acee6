//! Issuance capability and authority references.
//!
//! A [`CertificateIssuer`] is any backend able to sign a certificate for a name.
//! An [`Issuer`] pairs one backend with the identity and trust metadata the
//! manager needs: an id token, the backend's root certificate and the trust
//! domain appended to every common name it signs.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;

use super::pem::{CertificateChain, RootCertificate};
use super::types::{CommonName, IssuerId, SecretString, SerialNumber};
use crate::errors::IssuerError;

/// Raw material returned by a backend for one signing request.
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    /// PEM-encoded chain, leaf first
    pub cert_chain: CertificateChain,
    /// PEM-encoded private key (redacted in logs)
    pub private_key: SecretString,
    /// Serial number of the leaf
    pub serial_number: SerialNumber,
    /// Absolute expiration of the leaf
    pub expiration: DateTime<Utc>,
}

/// Certificate signing abstraction for mTLS identity certificates.
///
/// Implementations must be thread-safe and may be called concurrently from
/// request paths and the rotor. No timeout is imposed by callers; a backend
/// that talks to a remote CA is responsible for its own deadlines.
#[async_trait]
pub trait CertificateIssuer: Send + Sync + fmt::Debug {
    /// Sign a certificate for `common_name`, valid for `validity` from now.
    ///
    /// A negative `validity` yields a certificate that is already expired.
    async fn issue_certificate(
        &self,
        common_name: &CommonName,
        validity: Duration,
    ) -> Result<IssuedCertificate, IssuerError>;
}

/// Reference to one certificate authority version.
#[derive(Clone)]
pub struct Issuer {
    pub id: IssuerId,
    pub issuer: Arc<dyn CertificateIssuer>,
    pub ca: RootCertificate,
    pub trust_domain: String,
}

impl Issuer {
    pub fn new(
        id: impl Into<String>,
        issuer: Arc<dyn CertificateIssuer>,
        ca: RootCertificate,
        trust_domain: impl Into<String>,
    ) -> Self {
        Self { id: IssuerId::new(id), issuer, ca, trust_domain: trust_domain.into() }
    }
}

impl fmt::Debug for Issuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Issuer")
            .field("id", &self.id)
            .field("trust_domain", &self.trust_domain)
            .field("ca", &self.ca)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Roots a newly issued certificate carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustBundle {
    pub issuing_ca: RootCertificate,
    pub trusted_cas: RootCertificate,
}

impl TrustBundle {
    /// Compute the issuing root and the trust bundle for a signing/validating pair.
    ///
    /// The validating authority only contributes its known root; its backend is
    /// never called.
    pub fn from_issuers(signing: &Issuer, validating: &Issuer) -> Self {
        let trusted_cas = if validating.id != signing.id {
            signing.ca.concat(&validating.ca)
        } else {
            signing.ca.clone()
        };

        Self { issuing_ca: signing.ca.clone(), trusted_cas }
    }
}
