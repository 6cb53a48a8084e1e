// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory exception store for tests.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{append, clear, remove_matching, ExceptionStore, StorageError};

/// Exception store held in memory, counting writes
#[derive(Debug, Default)]
pub struct MemoryExceptionStore {
    entries: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryExceptionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `entries`
    pub fn with_entries(entries: Vec<String>) -> Self {
        Self {
            entries: Mutex::new(entries),
            ..Default::default()
        }
    }

    /// Make mutations fail with an IO error while set
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of persisted mutations so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn mutate<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Vec<String>) -> bool,
    {
        let mut entries = self.lock();
        let mut next = entries.clone();
        if !change(&mut next) {
            return Ok(());
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("exception writes disabled").into());
        }

        *entries = next;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ExceptionStore for MemoryExceptionStore {
    fn get(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.lock().clone())
    }

    fn add(&self, entries: &[String]) -> Result<(), StorageError> {
        self.mutate(|stored| append(stored, entries))
    }

    fn remove(&self, entries: &[String]) -> Result<(), StorageError> {
        self.mutate(|stored| remove_matching(stored, entries))
    }

    fn remove_all(&self) -> Result<(), StorageError> {
        self.mutate(clear)
    }
}
