// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ruleset cache
//!
//! Persistent `ruleset id -> (metadata, body)` store. A corrupt or
//! unreadable entry is reported as a miss so the caller simply downloads
//! the ruleset again.

mod file;
mod memory;

use std::io;
use thiserror::Error;

use crate::ruleset::{Ruleset, RulesetData};

pub use file::FileRulesetCache;
pub use memory::MemoryRulesetCache;

/// Storage for downloaded rulesets
///
/// Operations on different ids never block each other; operations on
/// the same id are linearizable.
pub trait RulesetCache: Send + Sync {
    /// Cached entry for `id`, or `None` if missing or unreadable.
    fn read(&self, id: &str) -> Option<RulesetData>;

    /// Store `body` for `ruleset`, replacing any previous entry.
    ///
    /// Readers never observe a partially written entry.
    fn save(&self, ruleset: &Ruleset, body: &[u8]) -> Result<(), CacheError>;

    /// Delete the entry for `id`; missing entries are not an error.
    fn remove(&self, id: &str) -> Result<(), CacheError>;

    /// Delete every entry.
    fn reset(&self) -> Result<(), CacheError>;
}

/// Errors that can occur with the ruleset cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Entry could not be encoded
    #[error("Encoding error: {0}")]
    Encode(String),
}
