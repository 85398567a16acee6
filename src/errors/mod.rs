//! # Error Handling
//!
//! Error types for certificate issuance, rotation and configuration, defined with
//! `thiserror`.

use crate::certificate::IssuerId;

/// Error returned by an issuance backend. The manager never inspects it.
pub type IssuerError = Box<dyn std::error::Error + Send + Sync>;

/// Custom result type for meshcert operations
pub type Result<T> = std::result::Result<T, CertificateError>;

/// Main error type for the certificate manager
#[derive(thiserror::Error, Debug)]
pub enum CertificateError {
    /// The signing issuer's backend failed to produce a certificate
    #[error("Issuance failed for issuer '{issuer_id}': {source}")]
    Issuance {
        issuer_id: IssuerId,
        #[source]
        source: IssuerError,
    },

    /// No signing issuer has been configured on the issuer source
    #[error("No signing issuer configured")]
    NoSigningIssuer,

    /// Identity prefix was empty
    #[error("Invalid identity prefix: {reason}")]
    InvalidIdentityPrefix { reason: String },

    /// A bundled backend could not be built or could not sign
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl CertificateError {
    /// Wrap a backend failure with the id of the issuer that produced it
    pub fn issuance(issuer_id: IssuerId, source: IssuerError) -> Self {
        Self::Issuance { issuer_id, source }
    }

    /// Create an invalid identity prefix error
    pub fn invalid_prefix<S: Into<String>>(reason: S) -> Self {
        Self::InvalidIdentityPrefix { reason: reason.into() }
    }

    /// Create a backend error
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Self::Backend(message.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Issuer id attached to an issuance failure, if any
    pub fn issuer_id(&self) -> Option<&IssuerId> {
        match self {
            Self::Issuance { issuer_id, .. } => Some(issuer_id),
            _ => None,
        }
    }
}

impl From<rcgen::Error> for CertificateError {
    fn from(err: rcgen::Error) -> Self {
        Self::backend(err.to_string())
    }
}
