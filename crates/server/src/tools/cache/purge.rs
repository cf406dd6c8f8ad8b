//! cache_purge tool implementation.
//!
//! Deletes one cached mention set, or all of them, and drops the in-process
//! memo so the next query synchronizes again.

use mentions_client::Pipeline;
use mentions_core::{CacheDb, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Cache key to delete. Everything when omitted.
    #[serde(default)]
    pub key: Option<String>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(
    cache: &CacheDb, pipeline: &RwLock<Pipeline>, params: CachePurgeParams,
) -> Result<CallToolResult, McpError> {
    let mut pipeline = pipeline.write().await;

    let deleted = match params.key {
        Some(key) if key.trim().is_empty() => {
            return Err(Error::InvalidInput("key must not be empty".to_string()).into());
        }
        Some(key) => cache.delete_entry(&key).await?,
        None => cache.purge_entries().await?,
    };
    pipeline.clear();

    tracing::info!(deleted, "purged mention cache");

    let output = CachePurgeOutput { deleted };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
