//! PEM-encoded certificate material.
//!
//! Both types are plain byte containers; nothing here parses or validates the
//! encoding.

use std::fmt;

/// One or more PEM-encoded CA certificates.
///
/// A trust bundle is represented as the concatenation of the individual roots.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RootCertificate(Vec<u8>);

impl RootCertificate {
    pub fn new(pem: impl Into<Vec<u8>>) -> Self {
        Self(pem.into())
    }

    /// Concatenate two bundles, `self` first.
    pub fn concat(&self, other: &RootCertificate) -> RootCertificate {
        let mut bytes = Vec::with_capacity(self.0.len() + other.0.len());
        bytes.extend_from_slice(&self.0);
        bytes.extend_from_slice(&other.0);
        RootCertificate(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RootCertificate {
    fn from(pem: &str) -> Self {
        Self(pem.as_bytes().to_vec())
    }
}

impl From<String> for RootCertificate {
    fn from(pem: String) -> Self {
        Self(pem.into_bytes())
    }
}

impl fmt::Debug for RootCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RootCertificate([{} bytes PEM])", self.0.len())
    }
}

/// PEM-encoded certificate chain, leaf first.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct CertificateChain(Vec<u8>);

impl CertificateChain {
    pub fn new(pem: impl Into<Vec<u8>>) -> Self {
        Self(pem.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for CertificateChain {
    fn from(pem: String) -> Self {
        Self(pem.into_bytes())
    }
}

impl fmt::Debug for CertificateChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertificateChain([{} bytes PEM])", self.0.len())
    }
}
