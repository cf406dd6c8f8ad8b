//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, CachePurgeParams, get_impl as cache_get_impl, purge_impl};
use crate::tools::webmentions::{WebmentionsGetParams, by_url_impl, get_impl as webmentions_get_impl};

use mentions_client::Pipeline;
use mentions_core::CacheDb;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use tokio::sync::RwLock;

/// The main MCP server handler for mcp-mentions.
#[derive(Clone)]
pub struct MentionsServer {
    tool_router: ToolRouter<Self>,
    pipeline: Arc<RwLock<Pipeline>>,
    cache: CacheDb,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl MentionsServer {
    /// Create a new server handler.
    pub fn new(pipeline: Pipeline, cache: CacheDb) -> Self {
        Self { tool_router: Self::tool_router(), pipeline: Arc::new(RwLock::new(pipeline)), cache }
    }

    /// Mentions of one page, sanitized and oldest first.
    #[tool(
        description = "Get the webmentions of a page, oldest first, with sanitized content. Optionally filter by mention types such as like-of or in-reply-to."
    )]
    async fn webmentions_get(&self, params: Parameters<WebmentionsGetParams>) -> Result<CallToolResult, McpError> {
        let pipeline = self.pipeline.read().await;
        webmentions_get_impl(&pipeline, params.0).await
    }

    /// Every mention grouped by normalized target URL.
    #[tool(description = "Get all webmentions grouped by normalized target URL.")]
    async fn webmentions_by_url(&self) -> Result<CallToolResult, McpError> {
        let pipeline = self.pipeline.read().await;
        by_url_impl(&pipeline).await
    }

    /// Cached entry metadata.
    #[tool(description = "Show metadata (saved time, size, record count) for cached mention sets.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        cache_get_impl(&self.cache, params.0).await
    }

    /// Delete cached entries and reset the in-process memo.
    #[tool(description = "Delete one cached mention set by key, or all of them. The next query fetches the feed again.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.cache, &self.pipeline, params.0).await
    }
}

impl ServerHandler for MentionsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-mentions".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
