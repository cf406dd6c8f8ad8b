//! SQLite-backed cache for synchronized mention sets.
//!
//! This module provides a persistent key-value cache using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - One opaque JSON document per key, stamped with its save time
//! - Freshness checks against a caller-supplied maximum age
//! - Automatic schema migrations
//! - WAL mode for concurrent readers

pub mod connection;
pub mod entries;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::EntryMeta;
pub use store::CacheStore;
