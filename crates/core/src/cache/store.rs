//! The contract the sync engine holds against its cache backend.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::connection::CacheDb;
use crate::Error;

/// Durable key-value storage for opaque JSON documents.
///
/// The engine never inspects how values are laid out on disk.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Whether a value exists under `key` and was saved less than `max_age` ago.
    async fn is_valid(&self, key: &str, max_age: Duration) -> Result<bool, Error>;

    /// The value under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<Value>, Error>;

    /// Store `value` under `key`, resetting its age.
    async fn save(&self, key: &str, value: &Value) -> Result<(), Error>;
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn is_valid(&self, key: &str, max_age: Duration) -> Result<bool, Error> {
        self.is_entry_fresh(key, max_age).await
    }

    async fn load(&self, key: &str) -> Result<Option<Value>, Error> {
        self.load_entry(key).await
    }

    async fn save(&self, key: &str, value: &Value) -> Result<(), Error> {
        self.save_entry(key, value).await
    }
}
