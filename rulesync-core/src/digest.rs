// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! SHA-256 content digests
//!
//! Used for content-blocker ids and for cache file names. The output is
//! lowercase hex and must stay stable across versions: compiled
//! artifacts are keyed by it downstream.

use ring::digest::{Context, SHA256};

/// Compute the SHA-256 digest of `data` as lowercase hex
///
/// # Example
/// ```
/// use rulesync_core::digest::sha256_hex;
///
/// let digest = sha256_hex(b"hello world");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    hex::encode(digest.as_ref())
}
