//! Grouping by target and the per-page query entry point.

pub mod sanitize;

use std::collections::BTreeMap;

use mentions_core::filter::{by_types, sort_by_published_asc};
use mentions_core::{Error, MentionRecord, SyncOptions, UrlRewrite};
use serde::{Serialize, Serializer};
use url::Url;

pub use sanitize::build_sanitizer;

/// Mentions grouped by normalized target URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MentionsByUrl {
    groups: BTreeMap<String, Vec<MentionRecord>>,
    rejected: usize,
}

impl MentionsByUrl {
    /// Records targeting `url`, which must already be normalized.
    pub fn get(&self, url: &str) -> Option<&[MentionRecord]> {
        self.groups.get(url).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of records dropped for lacking a target.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

impl Serialize for MentionsByUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.groups.serialize(serializer)
    }
}

/// A mention ready for display, with its sanitized content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMention {
    #[serde(flatten)]
    pub record: MentionRecord,
    #[serde(rename = "contentSanitized", skip_serializing_if = "Option::is_none")]
    pub content_sanitized: Option<String>,
}

/// Group `records` by normalized target, keeping input order within each group.
///
/// Records without a target are dropped and counted.
pub fn group_by_target(records: &[MentionRecord], rewrites: &[UrlRewrite]) -> MentionsByUrl {
    let mut grouped = MentionsByUrl::default();

    for record in records {
        let Some(target) = record.target.as_deref().filter(|t| !t.trim().is_empty()) else {
            let err = Error::MalformedRecord(record.source.clone().unwrap_or_else(|| "unknown source".into()));
            tracing::warn!(error = %err, "skipping mention without target");
            grouped.rejected += 1;
            continue;
        };

        grouped
            .groups
            .entry(normalize_target(target, rewrites))
            .or_default()
            .push(record.clone());
    }

    grouped
}

/// Apply `rewrites` in order, drop fragment and query, end with exactly one `/`.
pub fn normalize_target(target: &str, rewrites: &[UrlRewrite]) -> String {
    let mut url = target.trim().to_string();
    for rewrite in rewrites.iter().filter(|r| !r.from.is_empty()) {
        url = url.replace(&rewrite.from, &rewrite.to);
    }
    strip_to_path(&url)
}

/// Resolve `url` against `domain`, then normalize it like a target.
///
/// Falls back to `url` as given when `domain` is not a usable base.
pub fn absolute_url(domain: &str, url: &str) -> String {
    let resolved = Url::parse(domain).and_then(|base| base.join(url.trim()));
    match resolved {
        Ok(resolved) => strip_to_path(resolved.as_str()),
        Err(e) => {
            tracing::warn!(domain, url, error = %e, "could not resolve mention URL");
            strip_to_path(url)
        }
    }
}

fn strip_to_path(url: &str) -> String {
    let url = url.split('#').next().unwrap_or_default();
    let url = url.split('?').next().unwrap_or_default();
    format!("{}/", url.trim_end_matches('/'))
}

/// Mentions of `url`, filtered by `types`, rendered and oldest first.
///
/// An unknown URL yields an empty list. An empty `types` passes every type.
pub fn query<S: AsRef<str>>(
    options: &SyncOptions, grouped: &MentionsByUrl, url: &str, types: &[S],
) -> Result<Vec<RenderedMention>, Error> {
    if url.trim().is_empty() {
        return Err(Error::InvalidInput("url must not be empty".into()));
    }

    let key = absolute_url(&options.domain, url);
    let Some(group) = grouped.get(&key) else {
        tracing::debug!(url = %key, "no mentions");
        return Ok(Vec::new());
    };

    let mut records = if types.is_empty() { group.to_vec() } else { by_types(group, types) };
    sort_by_published_asc(&mut records);

    let sanitizer = build_sanitizer(&options.allowed_html);
    Ok(records
        .into_iter()
        .map(|record| {
            let content_sanitized = render_content(&record, options, &sanitizer);
            RenderedMention { record, content_sanitized }
        })
        .collect())
}

/// Sanitized content, or a short linked summary when the raw content is too long.
fn render_content(record: &MentionRecord, options: &SyncOptions, sanitizer: &ammonia::Builder<'_>) -> Option<String> {
    let raw = record.content_str();
    if raw.is_empty() {
        return None;
    }

    if raw.chars().count() > options.maximum_html_length {
        let text = ammonia::clean_text(&options.maximum_html_text);
        return Some(match record.source.as_deref().or(record.url.as_deref()) {
            Some(source) => {
                let source = ammonia::clean_text(source);
                format!(r#"{text} <a href="{source}">{source}</a>"#)
            }
            None => text,
        });
    }

    Some(sanitizer.clean(raw).to_string())
}
