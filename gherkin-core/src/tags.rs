//! Placeholder tag extraction.
//!
//! A tag is the text between a `<` and the next `>` on the same line, with no other
//! angle bracket in between. Tags come back in first-seen order, deduplicated. A `<`
//! without a closing `>` is simply not a tag; scanning continues after it.
//!
//! An empty `<>` is skipped instead of being reported as a tag with an empty name, which a
//! plain lazy `<(.*?)>` scan would return. An empty name could never head an editable
//! table column.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

pub(crate) static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<([^<>\r\n]+)>").unwrap());

/// Extract the ordered, deduplicated placeholder tags of `scenario`.
pub fn extract_tags(scenario: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    TAG_REGEX
        .captures_iter(scenario)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|tag| seen.insert(*tag))
        .map(str::to_string)
        .collect()
}
