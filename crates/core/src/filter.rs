//! Merge and filter primitives over mention sets.
//!
//! All functions preserve the relative order of the records they keep.

use std::collections::HashSet;

use crate::record::MentionRecord;

/// Deduplication key of a record.
#[derive(Debug, PartialEq, Eq, Hash)]
enum Identity {
    Source(String),
    /// Has data, but no source.
    Sourceless,
    /// Carries nothing at all, as normalized from a `null` entry.
    Empty,
}

impl Identity {
    fn of(record: &MentionRecord) -> Self {
        match &record.source {
            Some(source) => Self::Source(source.clone()),
            None if *record == MentionRecord::default() => Self::Empty,
            None => Self::Sourceless,
        }
    }
}

/// Keep the first record seen for each distinct source.
///
/// Records without a source share one key and empty records another, so at
/// most one of each survives.
pub fn dedupe(records: Vec<MentionRecord>) -> Vec<MentionRecord> {
    let mut seen: HashSet<Identity> = HashSet::with_capacity(records.len());
    records.into_iter().filter(|r| seen.insert(Identity::of(r))).collect()
}

/// Drop records whose source falls under any blocked prefix.
///
/// Records without a source are kept.
pub fn apply_blocklist(records: Vec<MentionRecord>, blocklist: &[String]) -> Vec<MentionRecord> {
    if blocklist.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| match r.source.as_deref() {
            Some(source) => !blocklist.iter().any(|entry| source_matches(source, entry)),
            None => true,
        })
        .collect()
}

/// Keep only records whose source falls under some allowed prefix.
///
/// An empty allow-list disables the filter. Otherwise records without a
/// source are dropped.
pub fn apply_allowlist(records: Vec<MentionRecord>, allowlist: &[String]) -> Vec<MentionRecord> {
    if allowlist.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| r.source.as_deref().is_some_and(|source| allowlist.iter().any(|entry| source_matches(source, entry))))
        .collect()
}

/// Newest ingestion first. Stable; unparsable times sort as the epoch.
pub fn sort_by_received_desc(records: &mut [MentionRecord]) {
    records.sort_by_key(|r| std::cmp::Reverse(r.received_millis()));
}

/// Oldest publication first. Stable; unparsable times sort as the epoch.
pub fn sort_by_published_asc(records: &mut [MentionRecord]) {
    records.sort_by_key(MentionRecord::published_millis);
}

/// Records whose type is one of `types`.
pub fn by_types<S: AsRef<str>>(records: &[MentionRecord], types: &[S]) -> Vec<MentionRecord> {
    records
        .iter()
        .filter(|r| r.kind.as_deref().is_some_and(|kind| types.iter().any(|t| t.as_ref() == kind)))
        .cloned()
        .collect()
}

/// Prefix test of `source` against an allow/block entry.
///
/// Both sides get a trailing slash, so `https://a.example` covers
/// `https://a.example/post` but not `https://a.example.net/`. Entries without
/// a scheme match any scheme.
pub fn source_matches(source: &str, entry: &str) -> bool {
    let entry = entry.trim();
    if entry.is_empty() {
        return false;
    }

    let source = with_trailing_slash(source.trim());
    let prefix = with_trailing_slash(entry);

    if entry.contains("://") {
        source.starts_with(&prefix)
    } else {
        let bare = source.split_once("://").map_or(source.as_str(), |(_, rest)| rest);
        bare.starts_with(&prefix)
    }
}

fn with_trailing_slash(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}
