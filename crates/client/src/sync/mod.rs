//! Incremental feed synchronization.
//!
//! One pass per [`SyncEngine::retrieve`] call:
//!
//! 1. Load whatever the cache holds as the working set, regardless of age.
//! 2. Return it unchanged if the cache is fresh and no refresh was asked for.
//! 3. Take the newest `received` time as the `since` cursor.
//! 4. Fetch, page by page for paged feeds, merging each page in front of the
//!    working set (dedupe, block-list, allow-list, sort newest first).
//! 5. Save the working set, even when nothing new arrived.
//!
//! Fetch failures end the fetch step and keep the working set as of the last
//! good page. Cache failures propagate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use mentions_core::filter::{apply_allowlist, apply_blocklist, dedupe, sort_by_received_desc};
use mentions_core::{CacheStore, Error, MentionRecord, SyncOptions};
use url::Url;

use crate::fetch::{FeedTransport, is_paginated, page_url, paged_base, parse_feed, with_since};

/// Keeps one cached mention set in step with its feed.
pub struct SyncEngine {
    options: Arc<SyncOptions>,
    feed: Url,
    staleness: Duration,
    store: Arc<dyn CacheStore>,
    transport: Arc<dyn FeedTransport>,
}

/// Outcome of one fetch step.
struct Fetched {
    /// Records in the upstream response, before merging.
    found: usize,
    records: Vec<MentionRecord>,
}

impl SyncEngine {
    /// Build an engine, rejecting incomplete options before any I/O.
    pub fn new(
        options: Arc<SyncOptions>, store: Arc<dyn CacheStore>, transport: Arc<dyn FeedTransport>,
    ) -> Result<Self, Error> {
        options.validate()?;
        let feed = parse_feed(&options.feed)?;
        let staleness = options.staleness()?;

        Ok(Self { options, feed, staleness, store, transport })
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Run one synchronization pass and return the full mention set,
    /// newest first.
    pub async fn retrieve(&self) -> Result<Vec<MentionRecord>, Error> {
        let started = Instant::now();
        let key = self.options.cache_key();

        let mut working = match self.store.load(&key).await? {
            Some(value) => MentionRecord::from_array(value),
            None => Vec::new(),
        };
        let cached = working.len();

        if !self.options.refresh && self.store.is_valid(&key, self.staleness).await? {
            tracing::debug!(key = %key, records = cached, "cache is fresh");
            return Ok(working);
        }

        let since = working.first().and_then(|r| r.received.clone());
        let base = with_since(&self.feed, since.as_deref());

        working = if is_paginated(&self.feed, self.options.pagination) {
            self.fetch_paged(&base, working).await?
        } else {
            self.fetch_single(&base, working).await?
        };
        working = self.apply_lists(working);

        self.store.save(&key, &MentionRecord::to_array(&working)).await?;

        tracing::info!(
            domain = %self.options.domain_host(),
            new = working.len().saturating_sub(cached),
            total = working.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "synced mentions"
        );

        Ok(working)
    }

    async fn fetch_single(&self, url: &Url, working: Vec<MentionRecord>) -> Result<Vec<MentionRecord>, Error> {
        match self.absorb(self.fetch(url).await)? {
            Some(fetched) => Ok(self.merge(fetched.records, working)),
            None => Ok(working),
        }
    }

    async fn fetch_paged(&self, base: &Url, mut working: Vec<MentionRecord>) -> Result<Vec<MentionRecord>, Error> {
        let (base, per_page) = paged_base(base, self.options.per_page);
        let mut page = 0;

        loop {
            let Some(fetched) = self.absorb(self.fetch(&page_url(&base, per_page, page)).await)? else {
                break;
            };
            if fetched.found == 0 {
                break;
            }

            working = self.merge(fetched.records, working);

            // Judge by what upstream sent, not by what survived the merge.
            if fetched.found < per_page {
                break;
            }

            page += 1;
            tokio::time::sleep(self.options.throttle()).await;
        }

        tracing::debug!(pages = page + 1, per_page, "paged fetch finished");
        Ok(working)
    }

    /// One request, checked against the response key contract.
    async fn fetch(&self, url: &Url) -> Result<Fetched, Error> {
        let mut body = self.transport.get_json(url).await?;

        let Some(records) = body.get_mut(&self.options.key).map(serde_json::Value::take) else {
            return Err(Error::FeedContract { key: self.options.key.clone(), feed: self.options.feed_host() });
        };

        let records = MentionRecord::from_array(records);
        Ok(Fetched { found: records.len(), records })
    }

    /// Turn fetch failures into "nothing fetched"; let everything else through.
    fn absorb(&self, result: Result<Fetched, Error>) -> Result<Option<Fetched>, Error> {
        match result {
            Ok(fetched) => Ok(Some(fetched)),
            Err(e) if e.is_fetch_failure() => {
                tracing::warn!(
                    domain = %self.options.domain_host(),
                    feed = %self.options.feed_host(),
                    error = %e,
                    "mention feed request failed, keeping cached set"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// New records first, then dedupe, filter and re-sort.
    fn merge(&self, fresh: Vec<MentionRecord>, working: Vec<MentionRecord>) -> Vec<MentionRecord> {
        let mut merged = fresh;
        merged.extend(working);

        let mut merged = self.apply_lists(dedupe(merged));
        sort_by_received_desc(&mut merged);
        merged
    }

    fn apply_lists(&self, records: Vec<MentionRecord>) -> Vec<MentionRecord> {
        apply_allowlist(apply_blocklist(records, &self.options.blocklist), &self.options.allowlist)
    }
}
