//! Background rotation of expired certificates.
//!
//! The rotor wakes every check interval, reissues each cached certificate whose
//! expiration has been reached, and announces every successful reissue on the
//! `CertificateRotated` topic. Failures are logged and counted per entry; they
//! never stop the scan or the rotor.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

use super::manager::Manager;
use crate::messaging::{Announcement, CertificateRotated, Event};

/// Smallest accepted check interval
const MIN_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of one rotor scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationSummary {
    pub rotated: usize,
    pub failed: usize,
    /// Entries released or replaced while their reissue was in flight
    pub skipped: usize,
}

/// Periodic rotation task bound to one manager.
#[derive(Debug)]
pub struct Rotor {
    manager: Arc<Manager>,
    check_interval: Duration,
    stop: CancellationToken,
}

impl Rotor {
    pub fn new(manager: Arc<Manager>, check_interval: Duration, stop: CancellationToken) -> Self {
        Self { manager, check_interval: check_interval.max(MIN_CHECK_INTERVAL), stop }
    }

    /// Tick until `stop` is cancelled.
    ///
    /// The first scan runs one interval after start. Cancellation is only
    /// observed between scans, so an in-flight reissue always completes.
    pub async fn run(self) {
        info!(
            check_interval_ms = self.check_interval.as_millis() as u64,
            "Starting certificate rotor"
        );

        let mut ticker = interval_at(Instant::now() + self.check_interval, self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.stop.cancelled() => break,
                _ = ticker.tick() => {
                    let span = info_span!("certificate_rotation", pass_id = %uuid::Uuid::new_v4());
                    let summary = self.check_and_rotate().instrument(span).await;
                    if summary != RotationSummary::default() {
                        info!(
                            rotated = summary.rotated,
                            failed = summary.failed,
                            skipped = summary.skipped,
                            "Certificate rotation pass completed"
                        );
                    }
                }
            }
        }

        info!("Certificate rotor stopped");
    }

    /// Reissue every cached certificate that has expired as of now.
    ///
    /// An entry released or replaced while its reissue is in flight keeps the
    /// newer state; the reissued certificate is dropped and nothing is
    /// announced for it.
    pub async fn check_and_rotate(&self) -> RotationSummary {
        let now = Utc::now();
        let mut summary = RotationSummary::default();

        for (prefix, previous) in self.manager.cache.entries() {
            if !previous.is_expired_at(now) {
                continue;
            }

            match self.manager.reissue(&prefix, &previous).await {
                Ok(Some(cert)) => {
                    info!(
                        prefix = %prefix,
                        previous_serial_number = %previous.serial_number(),
                        serial_number = %cert.serial_number(),
                        expiration = %cert.expiration(),
                        "Rotated certificate"
                    );
                    self.manager.metrics.record_rotation(true);
                    self.manager.publisher.publish(
                        Announcement::CertificateRotated,
                        Event::CertificateRotated(CertificateRotated {
                            identity_prefix: prefix,
                            previous_common_name: previous.common_name().clone(),
                            previous_serial_number: previous.serial_number().clone(),
                            common_name: cert.common_name().clone(),
                            serial_number: cert.serial_number().clone(),
                            expiration: cert.expiration(),
                        }),
                    );
                    summary.rotated += 1;
                }
                Ok(None) => {
                    debug!(prefix = %prefix, "Skipping rotation, cache entry changed");
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!(prefix = %prefix, error = %e, "Failed to rotate certificate");
                    self.manager.metrics.record_rotation(false);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
