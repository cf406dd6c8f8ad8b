//! Keyed JSON entries with a saved-at timestamp.
//!
//! Each key holds one opaque JSON document. Freshness is judged from the
//! time of the last `save_entry`, never from the document itself.

use std::time::Duration;

use super::connection::CacheDb;
use crate::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Metadata about one cache entry.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EntryMeta {
    pub key: String,
    pub saved_at: String,
    /// Size of the stored JSON in bytes.
    pub bytes: u64,
    /// Number of elements when the stored value is an array.
    pub records: Option<u64>,
}

impl CacheDb {
    /// Insert or replace the value stored under `key`, stamping it with now.
    pub async fn save_entry(&self, key: &str, value: &Value) -> Result<(), Error> {
        let key = key.to_string();
        let value_json = serde_json::to_string(value)?;
        let saved_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_entries (key, value_json, saved_at)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        value_json = excluded.value_json,
                        saved_at = excluded.saved_at",
                    params![key, value_json, saved_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get the value stored under `key`.
    ///
    /// Returns None if the key doesn't exist in the cache.
    pub async fn load_entry(&self, key: &str) -> Result<Option<Value>, Error> {
        let key = key.to_string();
        let json = self
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result =
                    conn.query_row("SELECT value_json FROM cache_entries WHERE key = ?1", params![key], |row| {
                        row.get(0)
                    });

                match result {
                    Ok(json) => Ok(Some(json)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        json.map(|j| serde_json::from_str(&j).map_err(Error::from)).transpose()
    }

    /// Check if an entry exists and was saved less than `max_age` ago.
    ///
    /// `Duration::MAX` reduces this to an existence check. A zero `max_age`
    /// is never fresh.
    pub async fn is_entry_fresh(&self, key: &str, max_age: Duration) -> Result<bool, Error> {
        let Some(saved_at) = self.saved_at(key).await? else {
            return Ok(false);
        };

        let age = (Utc::now() - saved_at).to_std().unwrap_or(Duration::ZERO);
        Ok(age < max_age)
    }

    /// Get metadata for the entry under `key`.
    pub async fn entry_meta(&self, key: &str) -> Result<Option<EntryMeta>, Error> {
        let Some(value) = self.load_entry(key).await? else {
            return Ok(None);
        };
        let Some(saved_at) = self.saved_at(key).await? else {
            return Ok(None);
        };

        Ok(Some(EntryMeta {
            key: key.to_string(),
            saved_at: saved_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            bytes: value.to_string().len() as u64,
            records: value.as_array().map(|a| a.len() as u64),
        }))
    }

    /// List every stored key, most recently saved first.
    pub async fn entry_keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT key FROM cache_entries ORDER BY saved_at DESC")?;
                let keys = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete the entry under `key`.
    ///
    /// Returns the number of deleted entries.
    pub async fn delete_entry(&self, key: &str) -> Result<u64, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM cache_entries WHERE key = ?1", params![key])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_entries(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM cache_entries", [])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    async fn saved_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, Error> {
        let key = key.to_string();
        let raw = self
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result =
                    conn.query_row("SELECT saved_at FROM cache_entries WHERE key = ?1", params![key], |row| row.get(0));

                match result {
                    Ok(saved_at) => Ok(Some(saved_at)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| Error::Serialization(format!("bad saved_at `{s}`: {e}")))
        })
        .transpose()
    }
}
