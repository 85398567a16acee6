//! # Messaging
//!
//! Topic-keyed publish/subscribe for control-plane announcements.
//!
//! Each [`Announcement`] topic owns a `tokio::sync::broadcast` channel. The rotor
//! publishes one [`Event::CertificateRotated`] per renewed identity; consumers
//! such as proxy config pushers subscribe independently and each receive every
//! event published after they subscribed. A subscriber that falls more than the
//! channel capacity behind observes `RecvError::Lagged` rather than blocking
//! the publisher.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::certificate::{CommonName, SerialNumber};

/// Default per-topic channel capacity
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

/// Announcement topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Announcement {
    /// A cached certificate was reissued by the rotor
    CertificateRotated,
}

impl Announcement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CertificateRotated => "certificate-rotated",
        }
    }
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload describing one certificate rotation.
///
/// Carries both the previous and the new identity so subscribers can map the
/// old credential to its replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateRotated {
    pub identity_prefix: String,
    pub previous_common_name: CommonName,
    pub previous_serial_number: SerialNumber,
    pub common_name: CommonName,
    pub serial_number: SerialNumber,
    pub expiration: DateTime<Utc>,
}

/// Broker payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    CertificateRotated(CertificateRotated),
}

/// Capability to publish an event on a topic.
pub trait Publisher: Send + Sync + fmt::Debug {
    fn publish(&self, topic: Announcement, event: Event);
}

/// In-process broker with one broadcast channel per topic.
#[derive(Debug)]
pub struct Broker {
    channels: DashMap<Announcement, broadcast::Sender<Arc<Event>>>,
    capacity: usize,
    published: AtomicU64,
}

impl Broker {
    pub fn new(capacity: usize) -> Self {
        Self { channels: DashMap::new(), capacity: capacity.max(1), published: AtomicU64::new(0) }
    }

    /// Receive every event published on `topic` from now on.
    pub fn subscribe(&self, topic: Announcement) -> broadcast::Receiver<Arc<Event>> {
        self.channels
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of live subscribers on `topic`.
    pub fn subscriber_count(&self, topic: Announcement) -> usize {
        self.channels.get(&topic).map(|tx| tx.receiver_count()).unwrap_or(0)
    }

    /// Total events published across all topics since creation.
    pub fn publish_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl Publisher for Broker {
    fn publish(&self, topic: Announcement, event: Event) {
        self.published.fetch_add(1, Ordering::Relaxed);

        let Some(tx) = self.channels.get(&topic) else {
            debug!(topic = %topic, "No subscribers for announcement");
            return;
        };

        match tx.send(Arc::new(event)) {
            Ok(receivers) => debug!(topic = %topic, receivers, "Published announcement"),
            Err(_) => warn!(topic = %topic, "Announcement dropped, all subscribers are gone"),
        }
    }
}
