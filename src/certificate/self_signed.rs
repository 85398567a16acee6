//! In-process certificate authority backed by `rcgen`.
//!
//! Generates an ECDSA P-256 root at construction and signs leaf certificates
//! for mTLS identities on demand. Intended for development meshes and tests;
//! production deployments plug a remote CA in behind [`CertificateIssuer`].

use async_trait::async_trait;
use chrono::{Duration, SubsecRound, Utc};
use rcgen::{
    BasicConstraints, Certificate as RcgenCertificate, CertificateParams, DistinguishedName,
    DnType, ExtendedKeyUsagePurpose, IsCa, KeyPair, KeyUsagePurpose,
    SerialNumber as RcgenSerial,
};
use std::fmt;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::debug;

use super::issuer::{CertificateIssuer, IssuedCertificate, Issuer};
use super::pem::{CertificateChain, RootCertificate};
use super::types::{CommonName, SecretString, SerialNumber};
use crate::errors::{CertificateError, IssuerError, Result};

/// Lifetime of the generated root
const ROOT_VALIDITY_DAYS: i64 = 3650;

/// Self-signed root that issues leaf certificates in memory.
pub struct SelfSignedIssuer {
    name: String,
    ca_cert: RcgenCertificate,
    ca_key: KeyPair,
    ca_pem: String,
}

impl SelfSignedIssuer {
    /// Generate a new root whose subject CN is `name`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, name.as_str());
        params.distinguished_name = dn;
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
            KeyUsagePurpose::DigitalSignature,
        ];

        let now = OffsetDateTime::now_utc();
        params.not_before = now;
        params.not_after = now + time::Duration::days(ROOT_VALIDITY_DAYS);

        let ca_key = KeyPair::generate()?;
        let ca_cert = params.self_signed(&ca_key)?;
        let ca_pem = ca_cert.pem();

        debug!(name = %name, "Generated self-signed root certificate");

        Ok(Self { name, ca_cert, ca_key, ca_pem })
    }

    /// PEM of the root, for building the [`Issuer`] reference.
    pub fn root_certificate(&self) -> RootCertificate {
        RootCertificate::from(self.ca_pem.as_str())
    }

    /// Wrap this backend in an authority reference.
    pub fn into_issuer(self, id: impl Into<String>, trust_domain: impl Into<String>) -> Issuer {
        let ca = self.root_certificate();
        Issuer::new(id, Arc::new(self), ca, trust_domain)
    }

    fn sign_leaf(
        &self,
        common_name: &CommonName,
        validity: Duration,
    ) -> Result<IssuedCertificate> {
        // X.509 validity has whole-second precision
        let expiration = Utc::now()
            .checked_add_signed(validity)
            .ok_or_else(|| CertificateError::backend("validity out of range"))?
            .trunc_subsecs(0);

        let mut params = CertificateParams::new(vec![common_name.as_str().to_string()])?;
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, common_name.as_str());
        params.distinguished_name = dn;
        params.is_ca = IsCa::NoCa;
        params.key_usages =
            vec![KeyUsagePurpose::DigitalSignature, KeyUsagePurpose::KeyEncipherment];
        params.extended_key_usages =
            vec![ExtendedKeyUsagePurpose::ServerAuth, ExtendedKeyUsagePurpose::ClientAuth];

        let serial = random_serial();
        params.serial_number = Some(RcgenSerial::from_slice(&serial));

        let not_after = OffsetDateTime::from_unix_timestamp(expiration.timestamp())
            .map_err(|e| CertificateError::backend(format!("Invalid expiration: {}", e)))?;
        let now = OffsetDateTime::now_utc();
        params.not_before = now.min(not_after - time::Duration::hours(1));
        params.not_after = not_after;

        let leaf_key = KeyPair::generate()?;
        let leaf = params.signed_by(&leaf_key, &self.ca_cert, &self.ca_key)?;

        let mut chain = leaf.pem();
        chain.push_str(&self.ca_pem);

        Ok(IssuedCertificate {
            cert_chain: CertificateChain::from(chain),
            private_key: SecretString::new(leaf_key.serialize_pem()),
            serial_number: SerialNumber::new(hex_string(&serial)),
            expiration,
        })
    }
}

#[async_trait]
impl CertificateIssuer for SelfSignedIssuer {
    async fn issue_certificate(
        &self,
        common_name: &CommonName,
        validity: Duration,
    ) -> std::result::Result<IssuedCertificate, IssuerError> {
        self.sign_leaf(common_name, validity).map_err(IssuerError::from)
    }
}

impl fmt::Debug for SelfSignedIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelfSignedIssuer").field("name", &self.name).finish_non_exhaustive()
    }
}

/// 128-bit positive serial
fn random_serial() -> [u8; 16] {
    let mut serial: [u8; 16] = rand::random();
    serial[0] &= 0x7f;
    if serial[0] == 0 {
        serial[0] = 0x01;
    }
    serial
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
