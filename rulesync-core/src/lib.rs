// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Rulesync Core Library
//!
//! Fetches versioned rule lists from a remote object store, caches them
//! locally, and compiles them with the user's exceptions into content
//! blockers for a downstream filtering engine.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rulesync_core::{RulesetSyncService, SyncConfig};
//! use rulesync_core::store::HttpObjectStore;
//!
//! let config = SyncConfig::default()
//!     .with_storage_path("/var/lib/rulesync")
//!     .with_remote_url("https://cdn.example.com/lists")
//!     .with_prefix("rulesets/");
//! let store = Arc::new(HttpObjectStore::new(&config)?);
//! let service = RulesetSyncService::open(&config, store)?;
//!
//! for ruleset in service.list_rulesets().await? {
//!     let blocker = service.get_content_blocker(&ruleset).await?;
//!     engine.install(&blocker.id, &blocker.body);
//! }
//! ```

mod atomic;
pub mod cache;
pub mod compiler;
pub mod config;
pub mod coordinator;
pub mod digest;
pub mod exceptions;
pub mod ruleset;
pub mod service;
pub mod store;

pub use cache::{CacheError, FileRulesetCache, MemoryRulesetCache, RulesetCache};
pub use compiler::{compile, CompileError, ContentBlocker};
pub use config::SyncConfig;
pub use coordinator::DownloadCoordinator;
pub use exceptions::{ExceptionStore, FileExceptionStore, MemoryExceptionStore, StorageError};
pub use ruleset::{ObjectEntry, Ruleset, RulesetData, RulesetType};
pub use service::{ResetError, RulesetSyncService, SyncError, SyncResult};
pub use store::{MockObjectStore, RemoteObjectStore, TransportError};
