//! Sync plus query, memoized per pipeline instance.
//!
//! The record set and its grouped view are computed on first use and kept
//! until [`Pipeline::clear`]. Nothing invalidates them behind the caller's back.

use std::sync::Arc;

use mentions_core::{CacheStore, Error, MentionRecord, SyncOptions};
use tokio::sync::OnceCell;

use crate::fetch::FeedTransport;
use crate::query::{MentionsByUrl, RenderedMention, group_by_target, query};
use crate::sync::SyncEngine;

pub struct Pipeline {
    engine: SyncEngine,
    records: OnceCell<Arc<Vec<MentionRecord>>>,
    grouped: OnceCell<Arc<MentionsByUrl>>,
}

impl Pipeline {
    /// Validate `options` and wire the engine. No I/O happens here.
    pub fn new(
        options: SyncOptions, store: Arc<dyn CacheStore>, transport: Arc<dyn FeedTransport>,
    ) -> Result<Self, Error> {
        let engine = SyncEngine::new(Arc::new(options), store, transport)?;
        Ok(Self { engine, records: OnceCell::new(), grouped: OnceCell::new() })
    }

    pub fn options(&self) -> &SyncOptions {
        self.engine.options()
    }

    /// Full mention set, newest first. Synchronizes at most once.
    pub async fn all(&self) -> Result<Arc<Vec<MentionRecord>>, Error> {
        self.records
            .get_or_try_init(|| async { Ok::<_, Error>(Arc::new(self.engine.retrieve().await?)) })
            .await
            .cloned()
    }

    /// Mentions grouped by normalized target. Synchronizes at most once.
    pub async fn by_url(&self) -> Result<Arc<MentionsByUrl>, Error> {
        self.grouped
            .get_or_try_init(|| async {
                let records = self.all().await?;
                let grouped = group_by_target(&records, &self.options().url_replacements);
                tracing::debug!(targets = grouped.len(), rejected = grouped.rejected(), "grouped mentions");
                Ok::<_, Error>(Arc::new(grouped))
            })
            .await
            .cloned()
    }

    /// Rendered mentions of `url`, optionally limited to `types`.
    pub async fn get_mentions<S: AsRef<str>>(&self, url: &str, types: &[S]) -> Result<Vec<RenderedMention>, Error> {
        let grouped = self.by_url().await?;
        query(self.options(), &grouped, url, types)
    }

    /// Drop the memoized state so the next call synchronizes again.
    pub fn clear(&mut self) {
        self.records.take();
        self.grouped.take();
    }
}
