//! Upstream mention shapes.
//!
//! Feeds have shipped the same logical fields under several names over the
//! years (`wm-source`, `source`, `data.url`, `url`, ...). `RawRecord` accepts
//! all of them at once; each accessor walks a fixed precedence chain where the
//! newer, more specific `wm-*` names win. Empty strings and values of the wrong
//! JSON type count as absent, so a chain never stops on an unusable value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A mention exactly as some upstream feed (or an older cache) delivered it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    #[serde(rename = "wm-source", deserialize_with = "lenient_string")]
    pub wm_source: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,

    #[serde(rename = "wm-target", deserialize_with = "lenient_string")]
    pub wm_target: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub target: Option<String>,

    #[serde(rename = "wm-property", deserialize_with = "lenient_string")]
    pub wm_property: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub activity: Option<Activity>,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub published: Option<String>,
    #[serde(rename = "wm-received", deserialize_with = "lenient_string")]
    pub wm_received: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub received: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub verified_date: Option<String>,

    #[serde(deserialize_with = "lenient_content")]
    pub content: Option<RawContent>,
    #[serde(rename = "contentSanitized", deserialize_with = "lenient_string")]
    pub content_sanitized_legacy: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub content_sanitized: Option<String>,

    #[serde(deserialize_with = "lenient")]
    pub data: Option<DataEnvelope>,

    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    pub author: Option<Value>,
    #[serde(rename = "wm-id")]
    pub wm_id: Option<Value>,
    pub id: Option<Value>,
}

/// Activity-streams style wrapper carrying the mention type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Activity {
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
}

/// Generic `data` envelope used by older feeds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataEnvelope {
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub published: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub content: Option<String>,
}

/// The two ways content arrives at the top level of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawContent {
    /// `"content": "<p>..</p>"`
    Text(String),
    /// `"content": { "html": .., "value": .., "text": .. }`
    Structured { html: Option<String>, value: Option<String>, text: Option<String> },
}

impl RawContent {
    fn resolve(&self) -> Option<&str> {
        match self {
            RawContent::Text(text) => Some(text),
            RawContent::Structured { html, value, text } => html.as_deref().or(value.as_deref()).or(text.as_deref()),
        }
    }
}

impl RawRecord {
    /// `wm-source` → `source` → `data.url` → `url`
    pub fn source(&self) -> Option<&str> {
        first([self.wm_source.as_deref(), self.source.as_deref(), self.data_field(|d| &d.url), self.url.as_deref()])
    }

    /// `data.url` → `url` → `wm-source` → `source`
    pub fn origin_url(&self) -> Option<&str> {
        first([self.data_field(|d| &d.url), self.url.as_deref(), self.wm_source.as_deref(), self.source.as_deref()])
    }

    /// `wm-target` → `target`
    pub fn target(&self) -> Option<&str> {
        first([self.wm_target.as_deref(), self.target.as_deref()])
    }

    /// `wm-property` → `activity.type` → `type`
    pub fn kind(&self) -> Option<&str> {
        first([
            self.wm_property.as_deref(),
            self.activity.as_ref().and_then(|a| a.kind.as_deref()),
            self.kind.as_deref(),
        ])
    }

    /// `data.published` → `published` → `wm-received` → `verified_date`
    pub fn published(&self) -> Option<&str> {
        first([
            self.data_field(|d| &d.published),
            self.published.as_deref(),
            self.wm_received.as_deref(),
            self.verified_date.as_deref(),
        ])
    }

    /// `wm-received` → `received` → `verified_date` → `published` → `data.published`
    pub fn received(&self) -> Option<&str> {
        first([
            self.wm_received.as_deref(),
            self.received.as_deref(),
            self.verified_date.as_deref(),
            self.published.as_deref(),
            self.data_field(|d| &d.published),
        ])
    }

    /// Content as delivered upstream, ignoring any sanitized rendition:
    /// `content.html` → `content.value` → `content.text` → `content` → `data.content`
    pub fn raw_content(&self) -> Option<&str> {
        first([self.content.as_ref().and_then(RawContent::resolve), self.data_field(|d| &d.content)])
    }

    /// Display content; a sanitized rendition, when present, wins.
    pub fn content(&self) -> Option<&str> {
        first([self.content_sanitized.as_deref(), self.content_sanitized_legacy.as_deref(), self.raw_content()])
    }

    /// `wm-id` → `id`
    pub fn id(&self) -> Option<&Value> {
        self.wm_id.as_ref().filter(|v| !v.is_null()).or(self.id.as_ref().filter(|v| !v.is_null()))
    }

    fn data_field(&self, field: impl Fn(&DataEnvelope) -> &Option<String>) -> Option<&str> {
        self.data.as_ref().and_then(|d| field(d).as_deref())
    }
}

fn first<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}

/// Keep non-empty strings; anything else becomes `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// Keep values that deserialize as `T`; anything else becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_content<'de, D>(deserializer: D) -> Result<Option<RawContent>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = |map: &serde_json::Map<String, Value>, key: &str| {
        map.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()).map(String::from)
    };

    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(RawContent::Text(s)),
        Some(Value::Object(map)) => Some(RawContent::Structured {
            html: text(&map, "html"),
            value: text(&map, "value"),
            text: text(&map, "text"),
        }),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_source_precedence() {
        assert_eq!(raw(json!({"wm-source": "a", "source": "b", "url": "d"})).source(), Some("a"));
        assert_eq!(raw(json!({"source": "b", "data": {"url": "c"}, "url": "d"})).source(), Some("b"));
        assert_eq!(raw(json!({"data": {"url": "c"}, "url": "d"})).source(), Some("c"));
        assert_eq!(raw(json!({"url": "d"})).source(), Some("d"));
        assert_eq!(raw(json!({})).source(), None);
    }

    #[test]
    fn test_origin_url_precedence() {
        assert_eq!(raw(json!({"data": {"url": "c"}, "url": "d", "wm-source": "a"})).origin_url(), Some("c"));
        assert_eq!(raw(json!({"url": "d", "wm-source": "a"})).origin_url(), Some("d"));
        assert_eq!(raw(json!({"wm-source": "a", "source": "b"})).origin_url(), Some("a"));
        assert_eq!(raw(json!({"source": "b"})).origin_url(), Some("b"));
    }

    #[test]
    fn test_target_precedence() {
        assert_eq!(raw(json!({"wm-target": "a", "target": "b"})).target(), Some("a"));
        assert_eq!(raw(json!({"target": "b"})).target(), Some("b"));
        assert_eq!(raw(json!({"wm-target": "", "target": "b"})).target(), Some("b"));
    }

    #[test]
    fn test_kind_precedence() {
        assert_eq!(raw(json!({"wm-property": "like-of", "type": "entry"})).kind(), Some("like-of"));
        assert_eq!(raw(json!({"activity": {"type": "repost"}, "type": "entry"})).kind(), Some("repost"));
        assert_eq!(raw(json!({"type": "mention-of"})).kind(), Some("mention-of"));
    }

    #[test]
    fn test_published_falls_back_to_received() {
        let when = "2024-01-01T12:00:00Z";
        assert_eq!(raw(json!({"data": {"published": when}})).published(), Some(when));
        assert_eq!(raw(json!({"published": when})).published(), Some(when));
        assert_eq!(raw(json!({"wm-received": when})).published(), Some(when));
        assert_eq!(raw(json!({"verified_date": when})).published(), Some(when));
    }

    #[test]
    fn test_received_falls_back_to_published() {
        let when = "2024-01-01T12:00:00Z";
        assert_eq!(raw(json!({"wm-received": when, "published": "x"})).received(), Some(when));
        assert_eq!(raw(json!({"verified_date": when})).received(), Some(when));
        assert_eq!(raw(json!({"published": when})).received(), Some(when));
        assert_eq!(raw(json!({"data": {"published": when}})).received(), Some(when));
    }

    #[test]
    fn test_content_shapes() {
        assert_eq!(raw(json!({"contentSanitized": "safe", "content": "raw"})).content(), Some("safe"));
        assert_eq!(raw(json!({"content": {"html": "<p>h</p>", "value": "v"}})).content(), Some("<p>h</p>"));
        assert_eq!(raw(json!({"content": {"value": "v"}})).content(), Some("v"));
        assert_eq!(raw(json!({"content": {"text": "t"}})).content(), Some("t"));
        assert_eq!(raw(json!({"content": "bare"})).content(), Some("bare"));
        assert_eq!(raw(json!({"data": {"content": "enveloped"}})).content(), Some("enveloped"));
        assert_eq!(raw(json!({"content": {}, "data": {"content": "enveloped"}})).content(), Some("enveloped"));
        assert_eq!(raw(json!({})).content(), None);
    }

    #[test]
    fn test_raw_content_ignores_sanitized() {
        let record = raw(json!({"content_sanitized": "safe", "content": "raw"}));
        assert_eq!(record.raw_content(), Some("raw"));
        assert_eq!(record.content(), Some("safe"));
    }

    #[test]
    fn test_wrong_types_count_as_absent() {
        let record = raw(json!({
            "wm-source": 42,
            "source": "https://a.example/",
            "data": "not an object",
            "activity": "nope",
            "content": 7,
        }));
        assert_eq!(record.source(), Some("https://a.example/"));
        assert!(record.data.is_none());
        assert!(record.activity.is_none());
        assert!(record.content().is_none());
    }

    #[test]
    fn test_id_precedence() {
        assert_eq!(raw(json!({"wm-id": 1, "id": 2})).id(), Some(&json!(1)));
        assert_eq!(raw(json!({"wm-id": null, "id": 2})).id(), Some(&json!(2)));
    }
}
