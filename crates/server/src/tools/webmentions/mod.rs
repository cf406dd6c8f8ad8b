//! Mention query MCP tools.
//!
//! Both tools read through the shared [`Pipeline`], so the feed is
//! synchronized at most once per process until the cache is purged.

pub mod by_url;
pub mod get;

pub use by_url::by_url_impl;
pub use get::{WebmentionsGetParams, get_impl};
