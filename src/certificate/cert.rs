//! Issued certificate entity and per-call issuance options.

use chrono::{DateTime, Duration, Utc};

use super::issuer::{IssuedCertificate, Issuer, TrustBundle};
use super::pem::{CertificateChain, RootCertificate};
use super::types::{CommonName, IssuerId, SecretString, SerialNumber};

/// One issued identity credential plus the trust metadata it was issued with.
///
/// Certificates are never mutated after construction; the cache replaces them
/// wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub(crate) common_name: CommonName,
    pub(crate) serial_number: SerialNumber,
    pub(crate) expiration: DateTime<Utc>,
    pub(crate) cert_chain: CertificateChain,
    pub(crate) private_key: SecretString,
    pub(crate) issuing_ca: RootCertificate,
    pub(crate) trusted_cas: RootCertificate,
    pub(crate) signing_issuer_id: IssuerId,
    pub(crate) validating_issuer_id: IssuerId,
}

impl Certificate {
    /// Assemble a certificate from backend output and the authority pair that
    /// was current when the backend was called.
    ///
    /// Provenance ids and the trust bundle come from the same pair.
    pub(crate) fn from_issued(
        common_name: CommonName,
        issued: IssuedCertificate,
        signing: &Issuer,
        validating: &Issuer,
    ) -> Self {
        let bundle = TrustBundle::from_issuers(signing, validating);
        Self {
            common_name,
            serial_number: issued.serial_number,
            expiration: issued.expiration,
            cert_chain: issued.cert_chain,
            private_key: issued.private_key,
            issuing_ca: bundle.issuing_ca,
            trusted_cas: bundle.trusted_cas,
            signing_issuer_id: signing.id.clone(),
            validating_issuer_id: validating.id.clone(),
        }
    }

    pub fn common_name(&self) -> &CommonName {
        &self.common_name
    }

    pub fn serial_number(&self) -> &SerialNumber {
        &self.serial_number
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    /// Root of the authority that signed this certificate.
    pub fn issuing_ca(&self) -> &RootCertificate {
        &self.issuing_ca
    }

    /// Roots a holder of this certificate should trust when validating peers.
    pub fn trusted_cas(&self) -> &RootCertificate {
        &self.trusted_cas
    }

    pub fn cert_chain(&self) -> &CertificateChain {
        &self.cert_chain
    }

    pub fn private_key(&self) -> &SecretString {
        &self.private_key
    }

    pub fn signing_issuer_id(&self) -> &IssuerId {
        &self.signing_issuer_id
    }

    pub fn validating_issuer_id(&self) -> &IssuerId {
        &self.validating_issuer_id
    }

    /// True once `now` has reached the expiration timestamp.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration <= now
    }

    /// True when this certificate was issued by exactly this signing/validating pair.
    pub(crate) fn issued_by(&self, signing: &IssuerId, validating: &IssuerId) -> bool {
        &self.signing_issuer_id == signing && &self.validating_issuer_id == validating
    }
}

/// Per-call overrides for [`Manager::issue_certificate`](super::Manager::issue_certificate).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueOptions {
    /// Validity for this call only; the manager default applies when unset.
    pub validity_period: Option<Duration>,
}

impl IssueOptions {
    pub fn with_validity_period(mut self, validity: Duration) -> Self {
        self.validity_period = Some(validity);
        self
    }
}

#[cfg(test)]
pub(crate) fn bare_certificate(common_name: &str, expiration: DateTime<Utc>) -> Certificate {
    Certificate {
        common_name: CommonName::from(common_name),
        serial_number: SerialNumber::default(),
        expiration,
        cert_chain: CertificateChain::default(),
        private_key: SecretString::new(""),
        issuing_ca: RootCertificate::default(),
        trusted_cas: RootCertificate::default(),
        signing_issuer_id: IssuerId::from(""),
        validating_issuer_id: IssuerId::from(""),
    }
}
