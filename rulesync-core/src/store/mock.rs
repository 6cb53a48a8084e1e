// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Object Store
//!
//! In-memory implementation of the RemoteObjectStore trait for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::remote::{RemoteObjectStore, TransportError, TransportResult};
use crate::ruleset::ObjectEntry;

/// Mock object store for testing.
///
/// Holds objects in memory, counts calls, and allows injection of
/// failures and download latency.
///
/// # Example
///
/// ```ignore
/// use rulesync_core::store::MockObjectStore;
///
/// let store = MockObjectStore::new();
/// store.put("rulesets/ads/easylist.json", "v1", br#"[]"#);
///
/// // ... run the code under test ...
///
/// assert_eq!(store.download_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockObjectStore {
    /// Listing entries in insertion order.
    entries: Mutex<Vec<ObjectEntry>>,
    /// Object bodies by key.
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    /// Error returned by every operation while set.
    inject_error: Mutex<Option<TransportError>>,
    /// Artificial latency applied to downloads.
    download_delay: Mutex<Duration>,
    list_calls: AtomicUsize,
    download_calls: AtomicUsize,
}

impl MockObjectStore {
    /// Creates an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object with complete metadata, replacing any previous
    /// object under the same key.
    pub fn put(&self, key: &str, validator: &str, body: &[u8]) {
        let entry = ObjectEntry::new(key, validator, 1_700_000_000, body.len() as u64);
        self.put_entry(entry, body);
    }

    /// Stores an object with an explicit listing entry.
    pub fn put_entry(&self, entry: ObjectEntry, body: &[u8]) {
        let mut entries = lock(&self.entries);
        match entries.iter_mut().find(|e| e.key == entry.key) {
            Some(existing) => *existing = entry.clone(),
            None => entries.push(entry.clone()),
        }
        lock(&self.bodies).insert(entry.key, body.to_vec());
    }

    /// Adds a listing entry without a downloadable body.
    pub fn push_listing(&self, entry: ObjectEntry) {
        lock(&self.entries).push(entry);
    }

    /// Injects an error returned by all operations until cleared.
    pub fn inject_error(&self, error: TransportError) {
        *lock(&self.inject_error) = Some(error);
    }

    /// Clears a previously injected error.
    pub fn clear_error(&self) {
        *lock(&self.inject_error) = None;
    }

    /// Delays every download by `delay`.
    pub fn set_download_delay(&self, delay: Duration) {
        *lock(&self.download_delay) = delay;
    }

    /// Number of `list` calls so far.
    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `download` calls so far.
    pub fn download_count(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    fn check_error(&self) -> TransportResult<()> {
        match lock(&self.inject_error).clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteObjectStore for MockObjectStore {
    async fn list(&self, prefix: &str) -> TransportResult<Vec<ObjectEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_error()?;

        Ok(lock(&self.entries)
            .iter()
            .filter(|e| e.key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn download(&self, key: &str) -> TransportResult<Vec<u8>> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *lock(&self.download_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.check_error()?;
        lock(&self.bodies)
            .get(key)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(key.to_string()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
