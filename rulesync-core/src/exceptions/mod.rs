// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! User-maintained exception list
//!
//! An ordered list of host/domain strings exempted from blocking. The
//! list keeps duplicates: `add` appends verbatim and `remove` drops every
//! equal occurrence. Every mutation is persisted before it returns, and
//! a failed mutation leaves the stored list unchanged.

mod file;
mod memory;

use std::io;
use thiserror::Error;

pub use file::FileExceptionStore;
pub use memory::MemoryExceptionStore;

/// Persistent exception list
pub trait ExceptionStore: Send + Sync {
    /// Current list, duplicates preserved.
    fn get(&self) -> Result<Vec<String>, StorageError>;

    /// Append `entries` verbatim. An empty slice performs no write.
    fn add(&self, entries: &[String]) -> Result<(), StorageError>;

    /// Remove every stored element equal to any of `entries`.
    fn remove(&self, entries: &[String]) -> Result<(), StorageError>;

    /// Clear the list.
    fn remove_all(&self) -> Result<(), StorageError>;
}

/// Errors that can occur with the exception store
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append `entries`; returns whether the list changed.
fn append(stored: &mut Vec<String>, entries: &[String]) -> bool {
    stored.extend_from_slice(entries);
    !entries.is_empty()
}

/// Drop every element equal to one of `entries`; returns whether the
/// list changed.
fn remove_matching(stored: &mut Vec<String>, entries: &[String]) -> bool {
    let before = stored.len();
    stored.retain(|e| !entries.contains(e));
    stored.len() != before
}

/// Empty the list; returns whether it changed.
fn clear(stored: &mut Vec<String>) -> bool {
    let changed = !stored.is_empty();
    stored.clear();
    changed
}
