//! Certificate manager: cache lookups, issuance and the public lifecycle API.

use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::cache::CertificateCache;
use super::cert::{Certificate, IssueOptions};
use super::issuer::Issuer;
use super::rotor::Rotor;
use super::source::{IssuerSnapshot, IssuerSource};
use super::types::CommonName;
use crate::config::CertificateConfig;
use crate::errors::{CertificateError, Result};
use crate::messaging::Publisher;
use crate::observability::MetricsRecorder;

/// Issues, caches and rotates service certificates.
///
/// The manager reads the current signing and validating issuers from its
/// [`IssuerSource`] at the start of every issuance. A cached certificate is
/// reused only while it was issued by exactly that pair and has not expired;
/// any authority changeover therefore forces reissuance on the next request
/// for the same identity prefix.
///
/// The lookup-then-issue sequence is not atomic: concurrent misses for one
/// prefix may each call the backend, and the last write wins.
#[derive(Debug)]
pub struct Manager {
    pub(crate) cache: CertificateCache,
    pub(crate) issuers: Arc<IssuerSource>,
    pub(crate) service_cert_validity: Duration,
    pub(crate) publisher: Arc<dyn Publisher>,
    pub(crate) metrics: MetricsRecorder,
    rotor_started: AtomicBool,
}

impl Manager {
    /// Create a manager over `issuers`.
    ///
    /// Fails with [`CertificateError::NoSigningIssuer`] when the source has no
    /// signing authority yet.
    pub fn new(
        issuers: Arc<IssuerSource>,
        service_cert_validity: Duration,
        publisher: Arc<dyn Publisher>,
    ) -> Result<Self> {
        let IssuerSnapshot { signing, validating } = issuers.snapshot()?;

        info!(
            signing_issuer_id = %signing.id,
            validating_issuer_id = %validating.id,
            trust_domain = %signing.trust_domain,
            service_cert_validity_secs = service_cert_validity.num_seconds(),
            "Certificate manager initialized"
        );

        Ok(Self {
            cache: CertificateCache::new(),
            issuers,
            service_cert_validity,
            publisher,
            metrics: MetricsRecorder::new(),
            rotor_started: AtomicBool::new(false),
        })
    }

    /// Create a manager using the validity from `config`.
    pub fn from_config(
        issuers: Arc<IssuerSource>,
        config: &CertificateConfig,
        publisher: Arc<dyn Publisher>,
    ) -> Result<Self> {
        Self::new(issuers, config.service_cert_validity(), publisher)
    }

    /// Launch the rotor.
    ///
    /// Returns the rotor task handle on the first call and `None` afterwards.
    /// Cancelling `stop` ends the rotor at its next tick boundary.
    pub fn start(
        self: &Arc<Self>,
        check_interval: std::time::Duration,
        stop: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        if self.rotor_started.swap(true, Ordering::SeqCst) {
            warn!("Certificate rotor already started");
            return None;
        }

        let rotor = Rotor::new(Arc::clone(self), check_interval, stop);
        Some(tokio::spawn(rotor.run()))
    }

    /// Return a certificate for `prefix`, issuing one when the cached entry is
    /// missing, expired, or was issued by a different signing/validating pair.
    ///
    /// The common name is `{prefix}.{signing trust domain}`. On backend failure
    /// the error is returned and the cache is left as it was.
    #[instrument(skip(self, options))]
    pub async fn issue_certificate(
        &self,
        prefix: &str,
        options: IssueOptions,
    ) -> Result<Arc<Certificate>> {
        if prefix.is_empty() {
            return Err(CertificateError::invalid_prefix("identity prefix cannot be empty"));
        }

        let IssuerSnapshot { signing, validating } = self.issuers.snapshot()?;

        if let Some(cached) = self.get_from_cache(prefix) {
            if cached.issued_by(&signing.id, &validating.id) && !cached.is_expired_at(Utc::now()) {
                debug!(common_name = %cached.common_name(), "Using cached certificate");
                self.metrics.record_cache_hit();
                return Ok(cached);
            }

            debug!(
                common_name = %cached.common_name(),
                cached_signing_issuer_id = %cached.signing_issuer_id(),
                cached_validating_issuer_id = %cached.validating_issuer_id(),
                expiration = %cached.expiration(),
                "Cached certificate is stale, reissuing"
            );
        }

        let validity = options.validity_period.unwrap_or(self.service_cert_validity);
        let cert = self.sign(prefix, &signing, &validating, validity).await?;
        self.cache.insert(prefix, Arc::clone(&cert));
        self.metrics.update_cached_certificates(self.cache.len());

        info!(
            common_name = %cert.common_name(),
            serial_number = %cert.serial_number(),
            expiration = %cert.expiration(),
            signing_issuer_id = %signing.id,
            validating_issuer_id = %validating.id,
            "Issued certificate"
        );

        Ok(cert)
    }

    /// Reissue `previous` under `prefix` with the default validity.
    ///
    /// The new certificate replaces the slot only while it still holds
    /// `previous`. When the entry was released or replaced during the backend
    /// call the result is discarded and `None` is returned.
    pub(crate) async fn reissue(
        &self,
        prefix: &str,
        previous: &Arc<Certificate>,
    ) -> Result<Option<Arc<Certificate>>> {
        let IssuerSnapshot { signing, validating } = self.issuers.snapshot()?;
        let cert = self.sign(prefix, &signing, &validating, self.service_cert_validity).await?;

        if !self.cache.replace_if_current(prefix, previous, Arc::clone(&cert)) {
            debug!(
                prefix = %prefix,
                serial_number = %cert.serial_number(),
                "Cache entry changed during reissue, discarding certificate"
            );
            return Ok(None);
        }

        Ok(Some(cert))
    }

    /// Call the signing backend and assemble the certificate. Does not touch
    /// the cache.
    async fn sign(
        &self,
        prefix: &str,
        signing: &Issuer,
        validating: &Issuer,
        validity: Duration,
    ) -> Result<Arc<Certificate>> {
        let common_name = CommonName::from_prefix(prefix, &signing.trust_domain);

        let issued = match signing.issuer.issue_certificate(&common_name, validity).await {
            Ok(issued) => issued,
            Err(source) => {
                warn!(
                    common_name = %common_name,
                    issuer_id = %signing.id,
                    error = %source,
                    "Signing issuer failed to issue certificate"
                );
                self.metrics.record_issuance_failure(signing.id.as_str());
                return Err(CertificateError::issuance(signing.id.clone(), source));
            }
        };

        self.metrics.record_certificate_issued(signing.id.as_str());
        Ok(Arc::new(Certificate::from_issued(common_name, issued, signing, validating)))
    }

    /// Drop the cached certificate for `prefix`, if any.
    pub fn release_certificate(&self, prefix: &str) {
        if let Some(cert) = self.cache.remove(prefix) {
            debug!(prefix = %prefix, common_name = %cert.common_name(), "Released certificate");
            self.metrics.update_cached_certificates(self.cache.len());
        }
    }

    /// Snapshot of every cached certificate, in no particular order.
    pub fn list_issued_certificates(&self) -> Vec<Arc<Certificate>> {
        self.cache.certificates()
    }

    /// Default validity applied when a call does not override it.
    pub fn service_cert_validity(&self) -> Duration {
        self.service_cert_validity
    }

    /// Authority source this manager reads from.
    pub fn issuers(&self) -> &Arc<IssuerSource> {
        &self.issuers
    }

    /// Cached certificate for `prefix`, whether or not it is still usable.
    pub fn get_from_cache(&self, prefix: &str) -> Option<Arc<Certificate>> {
        self.cache.get(prefix)
    }
}
