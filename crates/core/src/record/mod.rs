//! Canonical mention records.
//!
//! Upstream JSON is normalized once, at ingestion, into a `MentionRecord`.
//! The canonical form serializes with plain field names that the same
//! normalization reads back unchanged, so cached and fetched data share one
//! path.

mod raw;
mod time;

pub use raw::{Activity, DataEnvelope, RawContent, RawRecord};
pub use time::epoch_millis;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One notice that `source` refers to `target`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MentionRecord {
    /// Page making the mention; the identity key for deduplication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Origin URL of the mentioning post, which may differ from `source`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Page being mentioned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Mention kind, e.g. `like-of`, `in-reply-to`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Author-supplied time, falling back to ingestion time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    /// Ingestion time; the sync cursor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
    /// Raw HTML or text content, unsanitized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl From<RawRecord> for MentionRecord {
    fn from(raw: RawRecord) -> Self {
        let owned = |s: Option<&str>| s.map(String::from);
        Self {
            source: owned(raw.source()),
            url: owned(raw.origin_url()),
            target: owned(raw.target()),
            kind: owned(raw.kind()),
            published: owned(raw.published()),
            received: owned(raw.received()),
            content: owned(raw.raw_content()),
            id: raw.id().cloned(),
            name: raw.name,
            author: raw.author.filter(|a| !a.is_null()),
        }
    }
}

impl MentionRecord {
    /// Normalize any known upstream shape.
    ///
    /// Never fails: `null` and non-object values become an empty record so that
    /// malformed entries surface downstream instead of vanishing.
    pub fn from_value(value: Value) -> Self {
        if value.is_null() {
            return Self::default();
        }

        match serde_json::from_value::<RawRecord>(value) {
            Ok(raw) => raw.into(),
            Err(e) => {
                tracing::warn!(error = %e, "unreadable mention record");
                Self::default()
            }
        }
    }

    /// Normalize every element of a JSON array; non-arrays yield nothing.
    pub fn from_array(value: Value) -> Vec<Self> {
        match value {
            Value::Array(items) => items.into_iter().map(Self::from_value).collect(),
            Value::Null => Vec::new(),
            other => {
                tracing::warn!(kind = json_kind(&other), "expected an array of mention records");
                Vec::new()
            }
        }
    }

    /// Serialize a set of records for the cache.
    pub fn to_array(records: &[Self]) -> Value {
        Value::Array(records.iter().map(|r| serde_json::to_value(r).unwrap_or(Value::Null)).collect())
    }

    pub fn published_millis(&self) -> i64 {
        epoch_millis(self.published.as_deref())
    }

    pub fn received_millis(&self) -> i64 {
        epoch_millis(self.received.as_deref())
    }

    /// Content, or the empty string.
    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
