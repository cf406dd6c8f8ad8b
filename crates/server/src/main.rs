//! mcp-mentions server entry point.
//!
//! Boots the MCP server on stdio transport. Options come from `MENTIONS_*`
//! environment variables and an optional TOML file named by
//! `MENTIONS_CONFIG_FILE`. Logging goes to stderr to avoid interfering with
//! the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use mentions_client::{FeedClient, FetchConfig, Pipeline};
use mentions_core::{CacheDb, SyncOptions};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let options = SyncOptions::load()?;
    tracing::info!(domain = %options.domain_host(), feed = %options.feed_host(), "Starting mcp-mentions server on stdio transport");

    let cache = CacheDb::open(options.cache_path()).await?;
    let transport = FeedClient::new(FetchConfig::from(&options))?;
    let pipeline = Pipeline::new(options, Arc::new(cache.clone()), Arc::new(transport))?;

    let handler = handler::MentionsServer::new(pipeline, cache);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
