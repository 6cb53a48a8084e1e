// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ruleset metadata and the listing catalog

mod catalog;
mod types;

pub use catalog::{parse, parse_all};
pub use types::{ObjectEntry, Ruleset, RulesetData, RulesetType};
