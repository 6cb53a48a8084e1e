// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ruleset type definitions
//!
//! These types describe the rule-list files published in the remote
//! object store and the cached unit that pairs their metadata with the
//! downloaded body.

use serde::{Deserialize, Serialize};

/// One entry of a remote object listing
///
/// Every metadata field is optional because stores are free to omit
/// them; entries missing any of them are rejected by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Object key, e.g. `"rulesets/privacy/trackers.json"`
    pub key: String,
    /// Opaque version token (ETag-like)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
    /// Last modification time in unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<u64>,
    /// Object size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl ObjectEntry {
    /// Create a listing entry with complete metadata
    pub fn new(key: &str, validator: &str, last_modified: u64, size: u64) -> Self {
        Self {
            key: key.to_string(),
            validator: Some(validator.to_string()),
            last_modified: Some(last_modified),
            size: Some(size),
        }
    }
}

/// Category of a rule list, taken from its parent path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RulesetType {
    /// Advertising
    AdBlocking,
    /// Trackers and fingerprinting
    Privacy,
    /// Social widgets
    Social,
    /// Any category this version does not know about
    Unknown,
}

impl RulesetType {
    /// Map a raw path segment to a type; never fails
    pub fn from_segment(segment: &str) -> Self {
        match segment.to_ascii_lowercase().as_str() {
            "ad-blocking" | "adblocking" | "adblock" | "ads" => RulesetType::AdBlocking,
            "privacy" => RulesetType::Privacy,
            "social" => RulesetType::Social,
            _ => RulesetType::Unknown,
        }
    }

    /// Canonical directory name for this type
    pub fn dir_name(&self) -> &'static str {
        match self {
            RulesetType::AdBlocking => "ad-blocking",
            RulesetType::Privacy => "privacy",
            RulesetType::Social => "social",
            RulesetType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RulesetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Metadata describing one remote rule-list file
///
/// Rulesets are values: a fresh set is produced by every listing and
/// none is ever mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Remote object key (globally unique)
    pub id: String,
    /// Category from the parent path segment
    pub ruleset_type: RulesetType,
    /// File name (last path segment)
    pub name: String,
    /// Opaque version token; equal validators mean equal content
    pub validator: String,
    /// Last modification time in unix seconds
    pub last_modified: u64,
    /// Size in bytes as reported by the store
    pub size: u64,
}

/// A ruleset together with its downloaded body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetData {
    /// Metadata the body was downloaded for
    pub meta: Ruleset,
    /// Raw rule-list bytes
    pub body: Vec<u8>,
}
