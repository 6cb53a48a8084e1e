// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! HTTP object store
//!
//! Reference adapter that serves listings from `{remote_url}/index.json`
//! (a JSON array of [`ObjectEntry`]) and objects from
//! `{remote_url}/{key}` (each key segment percent-encoded), with:
//! - Size limits
//! - Proxy support
//! - Timeout configuration

use async_trait::async_trait;
use log::info;
use reqwest::{Client, StatusCode, Url};

use super::remote::{RemoteObjectStore, TransportError, TransportResult};
use crate::config::SyncConfig;
use crate::ruleset::ObjectEntry;

/// Fetches listings and rule lists over HTTP
pub struct HttpObjectStore {
    client: Client,
    base: Url,
    base_url: String,
    max_ruleset_size: u64,
}

impl HttpObjectStore {
    /// Create a new HTTP store from config
    pub fn new(config: &SyncConfig) -> TransportResult<Self> {
        let mut builder = Client::builder().timeout(config.timeout).user_agent(format!(
            "rulesync/{}",
            option_env!("CARGO_PKG_VERSION").unwrap_or("0.1.0")
        ));

        if let Some(proxy_url) = &config.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url).map_err(network_error)?);
        }

        let base_url = config.remote_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|e| TransportError::Network(format!("invalid remote url: {}", e)))?;

        Ok(Self {
            client: builder.build().map_err(network_error)?,
            base,
            base_url,
            max_ruleset_size: config.max_ruleset_size,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the object at `key`, below the base URL
    fn object_url(&self, key: &str) -> TransportResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Network(format!("not a base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(key.split('/'));
        Ok(url)
    }

    async fn get(&self, path: &str) -> TransportResult<reqwest::Response> {
        let url = self.object_url(path)?;
        let response = self.client.get(url).send().await.map_err(network_error)?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TransportError::Unauthorized),
            StatusCode::NOT_FOUND => Err(TransportError::NotFound(path.to_string())),
            status => Err(TransportError::Http(status.as_u16())),
        }
    }

    fn check_size(&self, size: u64) -> TransportResult<()> {
        if size > self.max_ruleset_size {
            return Err(TransportError::TooLarge {
                size,
                max: self.max_ruleset_size,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteObjectStore for HttpObjectStore {
    async fn list(&self, prefix: &str) -> TransportResult<Vec<ObjectEntry>> {
        let response = self.get("index.json").await?;
        let entries: Vec<ObjectEntry> = response.json().await.map_err(network_error)?;

        Ok(entries
            .into_iter()
            .filter(|entry| entry.key.starts_with(prefix))
            .collect())
    }

    async fn download(&self, key: &str) -> TransportResult<Vec<u8>> {
        let response = self.get(key).await?;

        // Check content length before downloading
        if let Some(len) = response.content_length() {
            self.check_size(len)?;
        }

        let data = response.bytes().await.map_err(network_error)?.to_vec();

        // Content-Length may be missing
        self.check_size(data.len() as u64)?;

        info!("Downloaded '{}' ({} bytes)", key, data.len());
        Ok(data)
    }
}

fn network_error(err: reqwest::Error) -> TransportError {
    TransportError::Network(err.to_string())
}
