// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! File-backed ruleset cache
//!
//! One file per ruleset under `<storage>/rulesets/`, named after the
//! SHA-256 of the ruleset id and holding a bincode-encoded
//! [`RulesetData`]. Files are written atomically.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, warn};
use serde::Serialize;

use super::{CacheError, RulesetCache};
use crate::atomic::atomic_write;
use crate::digest::sha256_hex;
use crate::ruleset::{Ruleset, RulesetData};

/// Local cache for downloaded rulesets
pub struct FileRulesetCache {
    cache_dir: PathBuf,
    /// Shared by per-entry operations, exclusive for `reset`.
    gate: RwLock<()>,
    /// One lock per ruleset id.
    entry_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Borrowed form of [`RulesetData`] with the same encoding.
#[derive(Serialize)]
struct EntryRef<'a> {
    meta: &'a Ruleset,
    body: &'a [u8],
}

impl FileRulesetCache {
    /// Create a new ruleset cache at the given storage path
    ///
    /// Creates a `rulesets/` subdirectory if it doesn't exist.
    pub fn new(storage_path: &Path) -> Result<Self, CacheError> {
        let cache_dir = storage_path.join("rulesets");
        fs::create_dir_all(&cache_dir)?;
        Ok(Self {
            cache_dir,
            gate: RwLock::new(()),
            entry_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Directory holding the cache entries
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the entry file for `id`
    pub fn entry_path(&self, id: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.bin", sha256_hex(id.as_bytes())))
    }

    fn entry_lock(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = lock(&self.entry_locks);
        Arc::clone(locks.entry(id.to_string()).or_default())
    }

    fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RulesetCache for FileRulesetCache {
    fn read(&self, id: &str) -> Option<RulesetData> {
        let _gate = self.shared();
        let entry_lock = self.entry_lock(id);
        let _entry = lock(&entry_lock);

        let bytes = match fs::read(self.entry_path(id)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("Cache miss for '{}'", id);
                return None;
            }
            Err(err) => {
                warn!("Unreadable cache entry for '{}': {}", id, err);
                return None;
            }
        };

        match bincode::deserialize::<RulesetData>(&bytes) {
            Ok(data) if data.meta.id == id => Some(data),
            Ok(data) => {
                warn!(
                    "Cache entry for '{}' belongs to '{}', ignoring",
                    id, data.meta.id
                );
                None
            }
            Err(err) => {
                warn!("Discarding corrupt cache entry for '{}': {}", id, err);
                None
            }
        }
    }

    fn save(&self, ruleset: &Ruleset, body: &[u8]) -> Result<(), CacheError> {
        let encoded = bincode::serialize(&EntryRef {
            meta: ruleset,
            body,
        })
        .map_err(|err| CacheError::Encode(err.to_string()))?;

        let _gate = self.shared();
        let entry_lock = self.entry_lock(&ruleset.id);
        let _entry = lock(&entry_lock);

        fs::create_dir_all(&self.cache_dir)?;
        atomic_write(&self.entry_path(&ruleset.id), &encoded)?;
        debug!(
            "Cached '{}' (validator {}, {} bytes)",
            ruleset.id,
            ruleset.validator,
            body.len()
        );
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<(), CacheError> {
        let _gate = self.shared();
        let entry_lock = self.entry_lock(id);
        let _entry = lock(&entry_lock);

        match fs::remove_file(self.entry_path(id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn reset(&self) -> Result<(), CacheError> {
        let _gate = self.exclusive();

        match fs::remove_dir_all(&self.cache_dir) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        fs::create_dir_all(&self.cache_dir)?;
        lock(&self.entry_locks).clear();

        info!("Ruleset cache cleared");
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
