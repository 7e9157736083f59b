//! Pure merge logic for the persisted `KEY=VALUE` settings file.
//!
//! No I/O: callers hand in the current file content and get the new content
//! back. Atomic replacement on disk lives in `crate::infra::env_file`.

use std::collections::{HashMap, HashSet};

/// Key of a `KEY=VALUE` line: the text before the first `=`.
///
/// Returns `None` for lines without `=` or with an empty key (blank lines,
/// comments without assignments, `=value`).
#[must_use]
pub fn line_key(line: &str) -> Option<&str> {
    let (key, _) = line.split_once('=')?;
    (!key.is_empty()).then_some(key)
}

/// Parse file content into ordered `(key, raw_value)` pairs.
///
/// Lines without a key are skipped. The value is everything after the first
/// `=`, unparsed. When a key repeats, the first occurrence wins.
#[must_use]
pub fn parse(content: &str) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    content
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            (!key.is_empty() && seen.insert(key)).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// Split a segment from `split_inclusive('\n')` into its body and line ending.
fn split_ending(segment: &str) -> (&str, &str) {
    if let Some(body) = segment.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = segment.strip_suffix('\n') {
        (body, "\n")
    } else {
        (segment, "")
    }
}

/// Merge `entries` into `existing` content.
///
/// * A line whose key is in `entries` is rewritten as `key=value`, in place,
///   keeping its original line ending.
/// * Every other line is copied byte for byte, ending included, in its
///   original position.
/// * Later lines repeating an already-rewritten key are dropped so each managed
///   key appears exactly once.
/// * Keys not found in `existing` are appended in `entries` order, `\n`-terminated.
///
/// A final line without a terminator gets a `\n` (empty input and no entries
/// yields an empty string). Values must be single-line; callers reject or
/// normalize line breaks before persisting. Running the merge on its own
/// output with the same entries returns the same bytes.
#[must_use]
pub fn upsert(existing: &str, entries: &[(&str, &str)]) -> String {
    let values: HashMap<&str, &str> = entries.iter().copied().collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = String::with_capacity(existing.len());

    for segment in existing.split_inclusive('\n') {
        let (body, ending) = split_ending(segment);
        let ending = if ending.is_empty() { "\n" } else { ending };
        match line_key(body).and_then(|k| values.get_key_value(k)) {
            Some((&key, &value)) => {
                if seen.insert(key) {
                    out.push_str(key);
                    out.push('=');
                    out.push_str(value);
                    out.push_str(ending);
                }
            }
            None => {
                out.push_str(body);
                out.push_str(ending);
            }
        }
    }

    for &(key, value) in entries {
        if seen.insert(key) {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
    }
    out
}

// ── Unit tests ───────────────────────────────────────────────────────────────
