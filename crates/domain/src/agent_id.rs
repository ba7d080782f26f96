//! Agent identifier canonicalization.
//!
//! Agent ids appear in configuration, bindings and lane names
//! (`agent:<id>`), so every place that compares or prints one goes through
//! [`normalize_agent_id`].

use std::sync::LazyLock;

use regex::Regex;

/// Id used when an agent id is empty or normalizes to nothing.
pub const DEFAULT_AGENT_ID: &str = "main";

const MAX_AGENT_ID_LEN: usize = 64;

static VALID_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9][a-z0-9_-]{0,63}$").expect("static regex"));

static INVALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_-]+").expect("static regex"));

/// Canonicalize an agent id: trimmed, lowercased, restricted to
/// `[a-z0-9_-]` and at most 64 characters.
///
/// Runs of other characters collapse into a single `-`, and dashes left at
/// either end are stripped.  Ids that end up empty become
/// [`DEFAULT_AGENT_ID`].
pub fn normalize_agent_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_AGENT_ID.into();
    }
    if VALID_ID.is_match(trimmed) {
        return trimmed.to_ascii_lowercase();
    }

    let lowered = trimmed.to_lowercase();
    let replaced = INVALID_CHARS.replace_all(&lowered, "-");
    let cleaned: String = replaced
        .trim_matches('-')
        .chars()
        .take(MAX_AGENT_ID_LEN)
        .collect();

    if cleaned.is_empty() {
        DEFAULT_AGENT_ID.into()
    } else {
        cleaned
    }
}
