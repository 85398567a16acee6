//! In-memory certificate cache keyed by identity prefix.
//!
//! Entries are `Arc<Certificate>` and are only ever replaced or removed, so a
//! reader never observes a partially built certificate.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use super::cert::Certificate;

/// Concurrent identity prefix → certificate store.
///
/// The key is always the caller-supplied prefix, never the derived common name,
/// so a slot survives a trust-domain change across issuers.
#[derive(Debug, Default, Clone)]
pub struct CertificateCache {
    inner: Arc<DashMap<String, Arc<Certificate>>>,
}

impl CertificateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, prefix: &str) -> Option<Arc<Certificate>> {
        self.inner.get(prefix).map(|entry| Arc::clone(entry.value()))
    }

    /// Store `cert` under `prefix`, replacing any previous entry.
    pub fn insert(&self, prefix: &str, cert: Arc<Certificate>) {
        debug!(prefix = %prefix, common_name = %cert.common_name(), "Caching certificate");
        self.inner.insert(prefix.to_string(), cert);
    }

    /// Replace the entry for `prefix` with `cert` only while it still holds
    /// `current`. The check and the write happen under the shard lock.
    ///
    /// Returns `false`, leaving the slot untouched, when the entry was removed
    /// or replaced by someone else.
    pub fn replace_if_current(
        &self,
        prefix: &str,
        current: &Arc<Certificate>,
        cert: Arc<Certificate>,
    ) -> bool {
        let Some(mut entry) = self.inner.get_mut(prefix) else {
            return false;
        };
        if !Arc::ptr_eq(entry.value(), current) {
            return false;
        }

        debug!(prefix = %prefix, common_name = %cert.common_name(), "Replacing cached certificate");
        *entry.value_mut() = cert;
        true
    }

    /// Remove the entry for `prefix`. Removing an absent key is a no-op.
    pub fn remove(&self, prefix: &str) -> Option<Arc<Certificate>> {
        self.inner.remove(prefix).map(|(_, cert)| cert)
    }

    /// Snapshot of every cached certificate.
    pub fn certificates(&self) -> Vec<Arc<Certificate>> {
        self.inner.iter().map(|entry| Arc::clone(entry.value())).collect()
    }

    /// Snapshot of every `(prefix, certificate)` pair.
    pub fn entries(&self) -> Vec<(String, Arc<Certificate>)> {
        self.inner.iter().map(|entry| (entry.key().clone(), Arc::clone(entry.value()))).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::cert::bare_certificate;
    use chrono::Utc;

    #[test]
    fn test_insert_replaces_wholesale() {
        let cache = CertificateCache::new();
        let first = Arc::new(bare_certificate("foo.one", Utc::now()));
        let second = Arc::new(bare_certificate("foo.two", Utc::now()));

        cache.insert("foo", Arc::clone(&first));
        cache.insert("foo", Arc::clone(&second));

        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&cache.get("foo").unwrap(), &second));
    }

    #[test]
    fn test_replace_if_current() {
        let cache = CertificateCache::new();
        let first = Arc::new(bare_certificate("foo.one", Utc::now()));
        let second = Arc::new(bare_certificate("foo.two", Utc::now()));
        let third = Arc::new(bare_certificate("foo.three", Utc::now()));

        assert!(!cache.replace_if_current("foo", &first, Arc::clone(&second)));
        assert!(cache.is_empty());

        cache.insert("foo", Arc::clone(&first));
        assert!(cache.replace_if_current("foo", &first, Arc::clone(&second)));
        assert!(Arc::ptr_eq(&cache.get("foo").unwrap(), &second));

        // stale expectation leaves the newer entry alone
        assert!(!cache.replace_if_current("foo", &first, third));
        assert!(Arc::ptr_eq(&cache.get("foo").unwrap(), &second));
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let cache = CertificateCache::new();
        assert!(cache.remove("missing").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entries_keep_prefix_keys() {
        let cache = CertificateCache::new();
        cache.insert("foo", Arc::new(bare_certificate("foo.domain.com", Utc::now())));

        let entries = cache.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "foo");
        assert_eq!(entries[0].1.common_name().as_str(), "foo.domain.com");
    }

    #[test]
    fn test_concurrent_writers_leave_one_entry_per_key() {
        let cache = CertificateCache::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        let prefix = format!("p{}", j % 10);
                        let cn = format!("{}.t{}", prefix, i);
                        cache.insert(&prefix, Arc::new(bare_certificate(&cn, Utc::now())));
                        let _ = cache.certificates();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 10);
    }
}
