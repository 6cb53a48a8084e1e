// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Exception list persisted as a JSON array in `exceptions.json`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use log::debug;

use super::{append, remove_matching, ExceptionStore, StorageError};
use crate::atomic::atomic_write;

/// File-backed exception store
///
/// Load-on-read, write-on-mutate. Mutations are serialized; reads see
/// either the previous or the new list, never a partial one.
pub struct FileExceptionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileExceptionStore {
    /// Create a store under `storage_path`
    pub fn new(storage_path: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(storage_path)?;
        Ok(Self {
            path: storage_path.join("exceptions.json"),
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the persisted list
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<String>, StorageError> {
        match fs::read(&self.path) {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Apply `change` to the stored list and persist the result if it
    /// reports a modification.
    fn mutate<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Vec<String>) -> bool,
    {
        let _guard = self.lock();
        let mut entries = self.load()?;
        if !change(&mut entries) {
            return Ok(());
        }

        let data = serde_json::to_vec(&entries)?;
        atomic_write(&self.path, &data)?;
        debug!("Persisted {} exceptions", entries.len());
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ExceptionStore for FileExceptionStore {
    fn get(&self) -> Result<Vec<String>, StorageError> {
        self.load()
    }

    fn add(&self, entries: &[String]) -> Result<(), StorageError> {
        if entries.is_empty() {
            return Ok(());
        }
        self.mutate(|stored| append(stored, entries))
    }

    fn remove(&self, entries: &[String]) -> Result<(), StorageError> {
        self.mutate(|stored| remove_matching(stored, entries))
    }

    fn remove_all(&self) -> Result<(), StorageError> {
        let _guard = self.lock();
        if !self.path.exists() {
            return Ok(());
        }
        // Overwrite without loading so a corrupt list can still be cleared
        atomic_write(&self.path, b"[]")?;
        debug!("Cleared exceptions");
        Ok(())
    }
}
