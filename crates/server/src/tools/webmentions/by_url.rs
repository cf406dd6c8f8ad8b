//! webmentions_by_url tool implementation.
//!
//! Returns every mention grouped by normalized target URL.

use mentions_client::Pipeline;
use mentions_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};

/// Implementation of the webmentions_by_url tool.
pub async fn by_url_impl(pipeline: &Pipeline) -> Result<CallToolResult, McpError> {
    let grouped = pipeline.by_url().await?;

    let json = serde_json::to_string_pretty(&*grouped)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize mentions: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::webmentions::fixtures::seeded_pipeline;
    use serde_json::Value;

    #[tokio::test]
    async fn test_by_url_impl() {
        let (pipeline, _cache) = seeded_pipeline().await;

        let result = by_url_impl(&pipeline).await.unwrap();
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val.get("text").and_then(|v| v.as_str()).unwrap();
        let grouped: Value = serde_json::from_str(text).unwrap();

        let keys: Vec<_> = grouped.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["https://example.com/other/", "https://example.com/post/"]);
        assert_eq!(grouped["https://example.com/post/"].as_array().map(Vec::len), Some(2));
    }
}
