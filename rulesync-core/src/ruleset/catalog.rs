// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Listing entry parsing
//!
//! Turns raw object-store listing entries into [`Ruleset`] records.
//! Keys follow the layout `<...>/<type>/<name>`.

use log::debug;

use super::types::{ObjectEntry, Ruleset, RulesetType};

/// Parse a listing entry into a ruleset
///
/// Returns `None` when the key has fewer than two non-empty path
/// segments or when validator, modification time or size is missing.
/// Unrecognized type segments map to [`RulesetType::Unknown`].
///
/// # Example
/// ```
/// use rulesync_core::ruleset::{parse, ObjectEntry, RulesetType};
///
/// let entry = ObjectEntry::new("rulesets/privacy/trackers.json", "v1", 0, 10);
/// let ruleset = parse(&entry).unwrap();
/// assert_eq!(ruleset.ruleset_type, RulesetType::Privacy);
/// assert_eq!(ruleset.name, "trackers.json");
/// ```
pub fn parse(entry: &ObjectEntry) -> Option<Ruleset> {
    let segments: Vec<&str> = entry.key.split('/').filter(|s| !s.is_empty()).collect();
    let [.., type_segment, name] = segments.as_slice() else {
        return None;
    };

    Some(Ruleset {
        id: entry.key.clone(),
        ruleset_type: RulesetType::from_segment(type_segment),
        name: name.to_string(),
        validator: entry.validator.clone()?,
        last_modified: entry.last_modified?,
        size: entry.size?,
    })
}

/// Parse every entry, silently dropping the ones that fail
///
/// Store order is preserved.
pub fn parse_all(entries: &[ObjectEntry]) -> Vec<Ruleset> {
    entries
        .iter()
        .filter_map(|entry| {
            let parsed = parse(entry);
            if parsed.is_none() {
                debug!("Skipping unparsable listing entry '{}'", entry.key);
            }
            parsed
        })
        .collect()
}
