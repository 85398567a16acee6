//! Current signing and validating authorities.
//!
//! [`IssuerSource`] is the handle an external root-certificate watcher uses to
//! tell the manager which authority signs and which validates. Both references
//! live in one immutable pair that is replaced wholesale, so a snapshot never
//! mixes two updates.

use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

use super::issuer::Issuer;
use crate::errors::{CertificateError, Result};

/// Signing/validating pair read at one instant.
#[derive(Debug, Clone)]
pub struct IssuerSnapshot {
    pub signing: Arc<Issuer>,
    pub validating: Arc<Issuer>,
}

#[derive(Debug, Default)]
struct IssuerPair {
    signing: Option<Arc<Issuer>>,
    validating: Option<Arc<Issuer>>,
}

/// Atomically swappable signing and validating authority references.
#[derive(Debug, Default)]
pub struct IssuerSource {
    pair: ArcSwap<IssuerPair>,
}

impl IssuerSource {
    pub fn new(signing: Issuer, validating: Issuer) -> Self {
        Self::from_pair(IssuerPair {
            signing: Some(Arc::new(signing)),
            validating: Some(Arc::new(validating)),
        })
    }

    /// One authority acting in both roles, the state outside of a changeover.
    pub fn single(issuer: Issuer) -> Self {
        let issuer = Arc::new(issuer);
        Self::from_pair(IssuerPair { signing: Some(Arc::clone(&issuer)), validating: Some(issuer) })
    }

    /// A source with no authority configured yet.
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_pair(pair: IssuerPair) -> Self {
        Self { pair: ArcSwap::from_pointee(pair) }
    }

    pub fn signing(&self) -> Option<Arc<Issuer>> {
        self.pair.load().signing.clone()
    }

    pub fn validating(&self) -> Option<Arc<Issuer>> {
        self.pair.load().validating.clone()
    }

    pub fn set_signing(&self, issuer: Issuer) {
        info!(
            issuer_id = %issuer.id,
            trust_domain = %issuer.trust_domain,
            "Signing issuer updated"
        );
        let issuer = Arc::new(issuer);
        self.pair.rcu(|current| IssuerPair {
            signing: Some(Arc::clone(&issuer)),
            validating: current.validating.clone(),
        });
    }

    pub fn set_validating(&self, issuer: Issuer) {
        info!(issuer_id = %issuer.id, "Validating issuer updated");
        let issuer = Arc::new(issuer);
        self.pair.rcu(|current| IssuerPair {
            signing: current.signing.clone(),
            validating: Some(Arc::clone(&issuer)),
        });
    }

    /// Replace both references in a single swap.
    pub fn set_issuers(&self, signing: Issuer, validating: Issuer) {
        info!(
            signing_issuer_id = %signing.id,
            validating_issuer_id = %validating.id,
            "Issuers updated"
        );
        self.pair.store(Arc::new(IssuerPair {
            signing: Some(Arc::new(signing)),
            validating: Some(Arc::new(validating)),
        }));
    }

    /// Read the current pair.
    ///
    /// Fails when no signing authority is configured. An absent validating
    /// authority means the signing authority validates too.
    pub fn snapshot(&self) -> Result<IssuerSnapshot> {
        let pair = self.pair.load();
        let signing = pair.signing.clone().ok_or(CertificateError::NoSigningIssuer)?;
        let validating = pair.validating.clone().unwrap_or_else(|| Arc::clone(&signing));
        Ok(IssuerSnapshot { signing, validating })
    }
}
