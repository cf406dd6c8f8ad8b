//! HTTP feed transport.
//!
//! ### Feed contract
//! - `GET` returns a JSON object holding the record array under a
//!   caller-chosen key
//! - Optional `since` cursor; paged feeds also take `page` and `per-page`
//!
//! ### Logging
//! - Feed URLs may carry an access token, so only the host is logged.

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use mentions_core::{Error, SyncOptions};
use reqwest::{Client, header};
use serde_json::Value;
use ::url::Url;

pub use self::url::{PAGED_FEED_HOST, UrlError, is_paginated, page_url, paged_base, parse_feed, with_since};

/// Anything that can answer a feed request with a JSON body.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Fetch `url` and parse its body as JSON.
    ///
    /// Failures are `Error::Transport` or `Error::HttpStatus`.
    async fn get_json(&self, url: &Url) -> Result<Value, Error>;
}

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "mentions-cache/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "mentions-cache/0.1".to_string(), timeout: Duration::from_millis(20000), max_redirects: 5 }
    }
}

impl From<&SyncOptions> for FetchConfig {
    fn from(options: &SyncOptions) -> Self {
        Self { user_agent: options.user_agent.clone(), timeout: options.timeout(), ..Default::default() }
    }
}

/// reqwest-backed feed transport.
pub struct FeedClient {
    http: Client,
}

impl FeedClient {
    /// Create a new feed client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl FeedTransport for FeedClient {
    async fn get_json(&self, url: &Url) -> Result<Value, Error> {
        let start = Instant::now();
        let host = url.host_str().unwrap_or_default().to_string();

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::Transport(format!("network error from {}: {}", host, e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus { status: status.as_u16(), feed: host });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| Error::Transport(format!("unreadable body from {}: {}", host, e.without_url())))?;

        tracing::debug!(feed = %host, fetch_ms = start.elapsed().as_millis() as u64, "fetched feed page");

        Ok(body)
    }
}
