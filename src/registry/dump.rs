//! Parser for the registry's text export.
//!
//! The export lists every registered claim; the ones we care about carry a
//! `tags:` line with a comma-separated mix of extensions (`.pdf`), MIME types
//! and legacy OSTypes:
//!
//! ```text
//! tags:                       .pdf, application/pdf, 'PDF '
//! ```
//!
//! Only dotted alphanumeric tokens are treated as extensions.

use std::collections::BTreeSet;

/// Longest extension kept by discovery unless configured otherwise.
pub const DEFAULT_MAX_EXTENSION_LEN: usize = 10;

const TAGS_MARKER: &str = "tags:";

/// Extract the set of extensions mentioned in a registry dump.
///
/// Extensions are lowercased with the leading dot removed. Empty tokens and
/// tokens longer than `max_len` characters are dropped.
pub fn parse_extensions(dump: &str, max_len: usize) -> BTreeSet<String> {
    dump.lines()
        .filter_map(|line| {
            let start = line.find(TAGS_MARKER)?;
            Some(&line[start + TAGS_MARKER.len()..])
        })
        .flat_map(|tags| tags.split(','))
        .filter_map(extension_token)
        .filter(|ext| !ext.is_empty() && ext.chars().count() <= max_len)
        .collect()
}

fn extension_token(token: &str) -> Option<String> {
    let ext = token.trim().strip_prefix('.')?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
