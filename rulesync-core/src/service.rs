// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ruleset Sync Service - orchestrates ruleset synchronization
//!
//! The RulesetSyncService is the main entry point of the crate. It
//! coordinates between:
//! - The remote object store (listing and downloads)
//! - The ruleset cache (reused while validators match)
//! - The exception store (user exceptions)
//! - The compiler (content blockers)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use log::{debug, info, warn};
use thiserror::Error;

use crate::cache::{CacheError, FileRulesetCache, RulesetCache};
use crate::compiler::{compile, CompileError, ContentBlocker};
use crate::config::SyncConfig;
use crate::coordinator::DownloadCoordinator;
use crate::exceptions::{ExceptionStore, FileExceptionStore, StorageError};
use crate::ruleset::{parse_all, Ruleset, RulesetData, RulesetType};
use crate::store::{RemoteObjectStore, TransportError};

/// Result type for sync service operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Synchronizes rulesets and compiles content blockers
pub struct RulesetSyncService {
    store: Arc<dyn RemoteObjectStore>,
    cache: Arc<dyn RulesetCache>,
    exceptions: Arc<dyn ExceptionStore>,
    coordinator: DownloadCoordinator,
    resets: Arc<ResetGate>,
    prefix: String,
}

/// Counts resets so a download started before one does not refill the
/// cache after it. Saves hold the gate shared, resets hold it exclusively.
#[derive(Debug, Default)]
struct ResetGate {
    lock: RwLock<()>,
    generation: AtomicU64,
}

impl RulesetSyncService {
    /// Create a service from its collaborators
    ///
    /// `prefix` restricts listings to keys starting with it.
    pub fn new(
        store: Arc<dyn RemoteObjectStore>,
        cache: Arc<dyn RulesetCache>,
        exceptions: Arc<dyn ExceptionStore>,
        prefix: &str,
    ) -> Self {
        Self {
            store,
            cache,
            exceptions,
            coordinator: DownloadCoordinator::new(),
            resets: Arc::new(ResetGate::default()),
            prefix: prefix.to_string(),
        }
    }

    /// Create a service with file-backed storage under
    /// `config.storage_path`
    pub fn open(config: &SyncConfig, store: Arc<dyn RemoteObjectStore>) -> SyncResult<Self> {
        let cache = FileRulesetCache::new(&config.storage_path)?;
        let exceptions = FileExceptionStore::new(&config.storage_path)?;
        Ok(Self::new(
            store,
            Arc::new(cache),
            Arc::new(exceptions),
            &config.prefix,
        ))
    }

    /// Listing prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get access to the download coordinator
    pub fn coordinator(&self) -> &DownloadCoordinator {
        &self.coordinator
    }

    /// List the rulesets currently published, in store order
    ///
    /// Entries that cannot be parsed are skipped.
    pub async fn list_rulesets(&self) -> SyncResult<Vec<Ruleset>> {
        let entries = self.store.list(&self.prefix).await?;
        let rulesets = parse_all(&entries);
        debug!(
            "Listed {} rulesets ({} entries)",
            rulesets.len(),
            entries.len()
        );
        Ok(rulesets)
    }

    /// List the published rulesets of one type
    pub async fn list_rulesets_of_type(
        &self,
        ruleset_type: RulesetType,
    ) -> SyncResult<Vec<Ruleset>> {
        let mut rulesets = self.list_rulesets().await?;
        rulesets.retain(|r| r.ruleset_type == ruleset_type);
        Ok(rulesets)
    }

    /// Body of `ruleset`, from the cache while its validator matches,
    /// downloaded otherwise
    ///
    /// Concurrent calls for the same ruleset share one download, which
    /// also refreshes the cache unless a reset happened meanwhile. A cache
    /// write failure is logged and does not fail the call.
    pub async fn get_ruleset(&self, ruleset: &Ruleset) -> SyncResult<Vec<u8>> {
        if let Some(cached) = self.cache.read(&ruleset.id) {
            if cached.meta.validator == ruleset.validator {
                debug!("Cache hit for '{}' ({})", ruleset.id, ruleset.validator);
                return Ok(cached.body);
            }
            debug!(
                "Stale cache for '{}': {} != {}",
                ruleset.id, cached.meta.validator, ruleset.validator
            );
        }

        let store = Arc::clone(&self.store);
        let cache = Arc::clone(&self.cache);
        let resets = Arc::clone(&self.resets);
        let target = ruleset.clone();
        let body = self
            .coordinator
            .request(&ruleset.id, move || {
                let generation = resets.generation.load(Ordering::SeqCst);
                async move {
                    info!("Downloading '{}' ({})", target.id, target.validator);
                    let body = store.download(&target.id).await?;

                    let _shared = resets.lock.read().unwrap_or_else(|p| p.into_inner());
                    if resets.generation.load(Ordering::SeqCst) != generation {
                        debug!("Reset during download of '{}', not caching", target.id);
                    } else if let Err(err) = cache.save(&target, &body) {
                        warn!("Failed to cache '{}': {}", target.id, err);
                    }
                    Ok::<_, TransportError>(body)
                }
            })
            .await?;

        Ok(Arc::unwrap_or_clone(body))
    }

    /// Compile `ruleset` with the current exceptions
    pub async fn get_content_blocker(&self, ruleset: &Ruleset) -> SyncResult<ContentBlocker> {
        let body = self.get_ruleset(ruleset).await?;
        let exceptions = self.exceptions.get()?;
        let data = RulesetData {
            meta: ruleset.clone(),
            body,
        };
        Ok(compile(&data, &exceptions)?)
    }

    /// Current exceptions, duplicates preserved
    pub fn get_exceptions(&self) -> SyncResult<Vec<String>> {
        Ok(self.exceptions.get()?)
    }

    /// Append exceptions verbatim
    pub fn add_exceptions(&self, entries: &[String]) -> SyncResult<()> {
        Ok(self.exceptions.add(entries)?)
    }

    /// Remove every occurrence of each entry
    pub fn remove_exceptions(&self, entries: &[String]) -> SyncResult<()> {
        Ok(self.exceptions.remove(entries)?)
    }

    /// Remove all exceptions
    pub fn remove_all_exceptions(&self) -> SyncResult<()> {
        Ok(self.exceptions.remove_all()?)
    }

    /// Clear the ruleset cache and the exception list
    ///
    /// Both are attempted even if the first fails. Downloads still running
    /// are detached: they answer their current callers but are not cached,
    /// and later calls download again.
    pub fn reset(&self) -> SyncResult<()> {
        let _exclusive = self.resets.lock.write().unwrap_or_else(|p| p.into_inner());
        self.resets.generation.fetch_add(1, Ordering::SeqCst);
        self.coordinator.forget_all();

        let error = ResetError {
            cache: self.cache.reset().err(),
            exceptions: self.exceptions.remove_all().err(),
        };

        if error.cache.is_none() && error.exceptions.is_none() {
            info!("Reset ruleset cache and exceptions");
            return Ok(());
        }
        warn!("Reset incomplete: {}", error);
        Err(SyncError::Reset(error))
    }
}

/// Failures of the individual steps of a reset
#[derive(Debug, Error)]
#[error("cache: {}, exceptions: {}", describe(.cache), describe(.exceptions))]
pub struct ResetError {
    /// Ruleset cache failure, if any
    pub cache: Option<CacheError>,
    /// Exception store failure, if any
    pub exceptions: Option<StorageError>,
}

fn describe<E: std::fmt::Display>(error: &Option<E>) -> String {
    match error {
        Some(err) => err.to_string(),
        None => "ok".to_string(),
    }
}

/// Errors that can occur with the sync service
#[derive(Debug, Error)]
pub enum SyncError {
    /// Remote store error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Ruleset cache error
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Exception store error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Compilation error
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// One or both reset steps failed
    #[error("Reset failed: {0}")]
    Reset(ResetError),
}
