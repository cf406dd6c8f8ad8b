//! cache_get tool implementation.
//!
//! Reports metadata for one cached mention set, or for all of them.

use mentions_core::{CacheDb, EntryMeta, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Cache key to inspect. All entries when omitted.
    #[serde(default)]
    pub key: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub entries: Vec<EntryMeta>,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(cache: &CacheDb, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let entries = match params.key {
        Some(key) => {
            let meta = cache
                .entry_meta(&key)
                .await?
                .ok_or_else(|| Error::CacheMiss(key.clone()))?;
            vec![meta]
        }
        None => {
            let mut entries = Vec::new();
            for key in cache.entry_keys().await? {
                if let Some(meta) = cache.entry_meta(&key).await? {
                    entries.push(meta);
                }
            }
            entries
        }
    };

    let output = CacheGetOutput { entries };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize entries: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn output(result: &CallToolResult) -> CacheGetOutput {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_get_impl_missing() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let params = CacheGetParams { key: Some("nonexistent".to_string()) };

        let result = get_impl(&cache, params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache
            .save_entry("webmentions-example.com", &json!([{"source": "https://a.example/"}, {"source": "https://b.example/"}]))
            .await
            .unwrap();

        let params = CacheGetParams { key: Some("webmentions-example.com".to_string()) };
        let output = output(&get_impl(&cache, params).await.unwrap());

        assert_eq!(output.entries.len(), 1);
        assert_eq!(output.entries[0].key, "webmentions-example.com");
        assert_eq!(output.entries[0].records, Some(2));
    }

    #[tokio::test]
    async fn test_get_impl_lists_all() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache.save_entry("webmentions-a.example", &json!([])).await.unwrap();
        cache.save_entry("webmentions-b.example", &json!([])).await.unwrap();

        let output = output(&get_impl(&cache, CacheGetParams::default()).await.unwrap());

        assert_eq!(output.entries.len(), 2);
    }
}
