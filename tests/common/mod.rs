//! Shared helpers for meshcert integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use meshcert::{
    certificate::{CertificateChain, SecretString},
    CertificateIssuer, CommonName, IssuedCertificate, Issuer, IssuerError, RootCertificate,
    SelfSignedIssuer, SerialNumber,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Issuer backend that counts calls and can be switched into a failing mode.
#[derive(Debug, Default)]
pub struct CountingIssuer {
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl CountingIssuer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl CertificateIssuer for CountingIssuer {
    async fn issue_certificate(
        &self,
        common_name: &CommonName,
        validity: Duration,
    ) -> Result<IssuedCertificate, IssuerError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err("backend unavailable".into());
        }
        let expiration = Utc::now().checked_add_signed(validity).ok_or("validity out of range")?;

        Ok(IssuedCertificate {
            cert_chain: CertificateChain::from(format!("chain:{}:{}", common_name, call)),
            private_key: SecretString::new(format!("key:{}", call)),
            serial_number: SerialNumber::new(format!("{:04}", call)),
            expiration,
        })
    }
}

/// Authority reference around a shared [`CountingIssuer`].
pub fn counting_issuer(id: &str, trust_domain: &str) -> (Issuer, Arc<CountingIssuer>) {
    let backend = Arc::new(CountingIssuer::default());
    let issuer = Issuer::new(id, backend.clone(), RootCertificate::from(id), trust_domain);
    (issuer, backend)
}

/// Authority reference backed by a freshly generated self-signed root.
pub fn self_signed_issuer(id: &str, trust_domain: &str) -> anyhow::Result<Issuer> {
    Ok(SelfSignedIssuer::new(format!("{} root", id))?.into_issuer(id, trust_domain))
}
