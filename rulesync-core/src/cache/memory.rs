// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory ruleset cache for tests and hosts without disk storage.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{CacheError, RulesetCache};
use crate::ruleset::{Ruleset, RulesetData};

/// Ruleset cache held in memory
#[derive(Debug, Default)]
pub struct MemoryRulesetCache {
    entries: RwLock<HashMap<String, RulesetData>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryRulesetCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `save`, `remove` and `reset` fail with an IO error while set
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    fn check_writable(&self) -> Result<(), CacheError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("cache writes disabled").into());
        }
        Ok(())
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, RulesetData>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, RulesetData>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RulesetCache for MemoryRulesetCache {
    fn read(&self, id: &str) -> Option<RulesetData> {
        self.read_entries().get(id).cloned()
    }

    fn save(&self, ruleset: &Ruleset, body: &[u8]) -> Result<(), CacheError> {
        self.check_writable()?;
        self.write_entries().insert(
            ruleset.id.clone(),
            RulesetData {
                meta: ruleset.clone(),
                body: body.to_vec(),
            },
        );
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<(), CacheError> {
        self.check_writable()?;
        self.write_entries().remove(id);
        Ok(())
    }

    fn reset(&self) -> Result<(), CacheError> {
        self.check_writable()?;
        self.write_entries().clear();
        Ok(())
    }
}
