// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote Object Store Trait
//!
//! Transport-agnostic abstraction over the storage that publishes rule
//! lists.

use async_trait::async_trait;
use thiserror::Error;

use crate::ruleset::ObjectEntry;

/// Result type for object store operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Remote object store.
///
/// Only the list/download contract is consumed; authentication and the
/// wire protocol belong to the implementation. Implementations never
/// retry on their own.
///
/// # Example
///
/// ```ignore
/// use rulesync_core::store::{MockObjectStore, RemoteObjectStore};
///
/// let store = MockObjectStore::new();
/// store.put("rulesets/ads/easylist.json", "v1", b"[]");
/// let entries = store.list("rulesets/").await?;
/// let body = store.download(&entries[0].key).await?;
/// ```
#[async_trait]
pub trait RemoteObjectStore: Send + Sync {
    /// Lists metadata of every object whose key starts with `prefix`.
    async fn list(&self, prefix: &str) -> TransportResult<Vec<ObjectEntry>>;

    /// Downloads the full body of the object stored under `key`.
    async fn download(&self, key: &str) -> TransportResult<Vec<u8>>;
}

/// Transport failures.
///
/// Cloneable so a single failed transfer can be handed to every caller
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Non-success status code
    #[error("HTTP error: {0}")]
    Http(u16),

    /// Credentials missing or rejected
    #[error("Unauthorized")]
    Unauthorized,

    /// No object under the requested key
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Connection or protocol failure
    #[error("Network error: {0}")]
    Network(String),

    /// Object exceeds the configured size limit
    #[error("Object too large: {size} bytes (max {max})")]
    TooLarge {
        /// Actual size in bytes
        size: u64,
        /// Maximum allowed size in bytes
        max: u64,
    },

    /// The transfer ended without producing an outcome
    #[error("Transfer interrupted")]
    Interrupted,
}
