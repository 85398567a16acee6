//! Test doubles shared by the certificate unit tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use super::issuer::{CertificateIssuer, IssuedCertificate, Issuer};
use super::pem::{CertificateChain, RootCertificate};
use super::types::{CommonName, SecretString, SerialNumber};
use crate::errors::IssuerError;

/// Deterministic backend that fails with `"{id} failed"` when `fail` is set.
#[derive(Debug)]
pub struct FakeIssuer {
    id: String,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeIssuer {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string(), fail: false, calls: AtomicUsize::new(0) }
    }

    pub fn failing(id: &str) -> Self {
        Self { id: id.to_string(), fail: true, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CertificateIssuer for FakeIssuer {
    async fn issue_certificate(
        &self,
        common_name: &CommonName,
        validity: Duration,
    ) -> Result<IssuedCertificate, IssuerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(format!("{} failed", self.id).into());
        }

        fake_certificate(common_name, validity)
    }
}

/// Backend that parks every request until the test releases it.
///
/// `entered` fires once a request is waiting; `release` lets one through.
#[derive(Debug, Default)]
pub struct GatedIssuer {
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl CertificateIssuer for GatedIssuer {
    async fn issue_certificate(
        &self,
        common_name: &CommonName,
        validity: Duration,
    ) -> Result<IssuedCertificate, IssuerError> {
        self.entered.notify_one();
        self.release.notified().await;
        fake_certificate(common_name, validity)
    }
}

fn fake_certificate(
    common_name: &CommonName,
    validity: Duration,
) -> Result<IssuedCertificate, IssuerError> {
    let expiration = Utc::now().checked_add_signed(validity).ok_or("validity out of range")?;
    let serial = uuid::Uuid::new_v4().simple().to_string();
    Ok(IssuedCertificate {
        cert_chain: CertificateChain::from(format!("cert:{}:{}", common_name, serial)),
        private_key: SecretString::new(format!("key:{}", serial)),
        serial_number: SerialNumber::new(serial),
        expiration,
    })
}

/// Authority reference backed by a [`FakeIssuer`] whose root is the id itself.
pub fn fake_issuer(id: &str, trust_domain: &str) -> Issuer {
    Issuer::new(id, Arc::new(FakeIssuer::new(id)), RootCertificate::from(id), trust_domain)
}

/// Authority reference whose backend always fails.
pub fn failing_issuer(id: &str, trust_domain: &str) -> Issuer {
    Issuer::new(id, Arc::new(FakeIssuer::failing(id)), RootCertificate::from(id), trust_domain)
}
