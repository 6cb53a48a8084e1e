// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content blocker compilation
//!
//! Merges a base rule list (a JSON array of rule objects) with the
//! user's exceptions. Exceptions become a single trailing rule that
//! ignores every previous rule for third-party loads on the excepted
//! domains. The base text is never re-serialized, so an empty exception
//! list reproduces it byte for byte.

use serde::Serialize;
use thiserror::Error;

use crate::digest::sha256_hex;
use crate::ruleset::{Ruleset, RulesetData};

/// Wildcard marker prefixed to exception domains
const WILDCARD: char = '*';

/// Compiled artifact handed to the content-filtering engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlocker {
    /// Stable id derived from the ruleset id and the sorted exceptions
    pub id: String,
    /// Ruleset the body was compiled from
    pub base_ruleset: Ruleset,
    /// Compiled rule-list text
    pub body: String,
    /// Exceptions as given to the compiler
    pub exceptions: Vec<String>,
}

/// Errors that can occur while compiling
#[derive(Debug, Error)]
pub enum CompileError {
    /// Base body is not UTF-8 or not a JSON array
    #[error("Malformed ruleset {id}: {reason}")]
    MalformedRuleset {
        /// Ruleset id
        id: String,
        /// What was wrong with the body
        reason: String,
    },
}

#[derive(Serialize)]
struct Rule<'a> {
    trigger: Trigger<'a>,
    action: Action,
}

#[derive(Serialize)]
struct Trigger<'a> {
    #[serde(rename = "url-filter")]
    url_filter: &'static str,
    #[serde(rename = "if-domain")]
    if_domain: &'a [String],
    #[serde(rename = "load-type")]
    load_type: [&'static str; 1],
}

#[derive(Serialize)]
struct Action {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Normalize an exception for use as a trigger domain
///
/// Lowercases and prefixes the wildcard marker unless already present.
///
/// # Example
/// ```
/// use rulesync_core::compiler::normalize_exception;
///
/// assert_eq!(normalize_exception("Google.com"), "*google.com");
/// assert_eq!(normalize_exception("*yahoo.com"), "*yahoo.com");
/// ```
pub fn normalize_exception(exception: &str) -> String {
    let lower = exception.to_lowercase();
    if lower.starts_with(WILDCARD) {
        lower
    } else {
        format!("{WILDCARD}{lower}")
    }
}

/// Stable id of a content blocker
///
/// SHA-256 of `"<ruleset id>-<sorted exceptions joined by ','>"`.
/// Exceptions are sorted but neither normalized nor deduplicated.
pub fn content_blocker_id(ruleset_id: &str, exceptions: &[String]) -> String {
    let mut sorted: Vec<&str> = exceptions.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    let key = format!("{}-{}", ruleset_id, sorted.join(","));
    sha256_hex(key.as_bytes())
}

/// Compile `data` with `exceptions` into a content blocker
pub fn compile(data: &RulesetData, exceptions: &[String]) -> Result<ContentBlocker, CompileError> {
    let malformed = |reason: String| CompileError::MalformedRuleset {
        id: data.meta.id.clone(),
        reason,
    };

    let text = std::str::from_utf8(&data.body).map_err(|e| malformed(e.to_string()))?;
    serde_json::from_str::<Vec<serde_json::Value>>(text).map_err(|e| malformed(e.to_string()))?;

    let body = if exceptions.is_empty() {
        text.to_string()
    } else {
        append_rule(text, exceptions).map_err(|e| malformed(e.to_string()))?
    };

    Ok(ContentBlocker {
        id: content_blocker_id(&data.meta.id, exceptions),
        base_ruleset: data.meta.clone(),
        body,
        exceptions: exceptions.to_vec(),
    })
}

/// Append the exception rule to a validated JSON array text.
fn append_rule(text: &str, exceptions: &[String]) -> serde_json::Result<String> {
    let domains: Vec<String> = exceptions.iter().map(|e| normalize_exception(e)).collect();
    let rule = serde_json::to_string(&Rule {
        trigger: Trigger {
            url_filter: ".*",
            if_domain: &domains,
            load_type: ["third-party"],
        },
        action: Action {
            kind: "ignore-previous-rules",
        },
    })?;

    // Validated as an array, so it ends with ']' after trimming
    let open = text.trim_end();
    let open = &open[..open.len() - 1];
    let empty = open.trim().len() == 1;
    let separator = if empty { "" } else { "," };

    Ok(format!("{open}{separator}{rule}]"))
}
