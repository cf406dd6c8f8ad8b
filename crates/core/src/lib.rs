//! Core types and shared functionality for the mention cache.
//!
//! This crate provides:
//! - Cache implementation with SQLite backend
//! - Unified error types
//! - Sync options with layered loading
//! - Canonical mention records and the primitives that merge and filter them

pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod record;

pub use cache::{CacheDb, CacheStore, EntryMeta};
pub use config::{ConfigError, HtmlPolicy, Pagination, SyncOptions, UrlRewrite};
pub use error::Error;
pub use record::MentionRecord;
