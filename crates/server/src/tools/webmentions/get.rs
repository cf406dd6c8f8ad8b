//! webmentions_get tool implementation.
//!
//! Returns the rendered mentions of one page, oldest first.

use mentions_client::{Pipeline, RenderedMention};
use mentions_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the webmentions_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebmentionsGetParams {
    /// Page URL, absolute or relative to the configured domain.
    pub url: String,

    /// Only return mentions of these types, e.g. `like-of`, `in-reply-to`.
    #[serde(default)]
    pub types: Option<Vec<String>>,
}

/// Output from the webmentions_get tool.
#[derive(Debug, Clone, Serialize)]
pub struct WebmentionsGetOutput {
    pub url: String,
    pub count: usize,
    pub mentions: Vec<RenderedMention>,
}

/// Implementation of the webmentions_get tool.
pub async fn get_impl(pipeline: &Pipeline, params: WebmentionsGetParams) -> Result<CallToolResult, McpError> {
    let types = params.types.unwrap_or_default();
    let mentions = pipeline.get_mentions(&params.url, &types).await?;

    let output = WebmentionsGetOutput { url: params.url, count: mentions.len(), mentions };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize mentions: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
