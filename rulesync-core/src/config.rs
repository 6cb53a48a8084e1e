// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration for ruleset synchronization

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the ruleset sync system
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Local storage path for the ruleset cache and exception list
    pub storage_path: PathBuf,

    /// Remote object store URL (used by the HTTP store)
    pub remote_url: String,

    /// Key prefix the listing is restricted to
    pub prefix: String,

    /// HTTP timeout for list and download requests
    pub timeout: Duration,

    /// Maximum rule-list size (bytes)
    pub max_ruleset_size: u64,

    /// Proxy URL
    pub proxy_url: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("."),
            remote_url: "https://rules.example.invalid".to_string(),
            prefix: String::new(),
            timeout: Duration::from_secs(30),
            max_ruleset_size: 20 * 1024 * 1024, // 20 MB
            proxy_url: None,
        }
    }
}

impl SyncConfig {
    /// Configure with a storage path
    pub fn with_storage_path(mut self, storage_path: impl Into<PathBuf>) -> Self {
        self.storage_path = storage_path.into();
        self
    }

    /// Configure with a remote URL; trailing slashes are dropped
    pub fn with_remote_url(mut self, remote_url: &str) -> Self {
        self.remote_url = remote_url.trim_end_matches('/').to_string();
        self
    }

    /// Restrict listings to keys starting with `prefix`
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Configure with custom proxy
    pub fn with_proxy(mut self, proxy_url: String) -> Self {
        self.proxy_url = Some(proxy_url);
        self
    }
}
