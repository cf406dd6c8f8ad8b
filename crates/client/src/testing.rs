//! Test doubles shared by the sync, pipeline and integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mentions_core::{Error, Pagination, SyncOptions};
use serde_json::{Value, json};
use url::Url;

use crate::fetch::FeedTransport;

/// Transport that replays canned responses in order and records every URL.
///
/// Once the script runs out, every request fails with a transport error.
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value, Error>>>,
    requests: Mutex<Vec<Url>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: impl IntoIterator<Item = Result<Value, Error>>) -> Arc<Self> {
        Arc::new(Self { responses: Mutex::new(responses.into_iter().collect()), requests: Mutex::new(Vec::new()) })
    }

    pub(crate) fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl FeedTransport for ScriptedTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, Error> {
        self.requests.lock().unwrap().push(url.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Transport("script exhausted".into())))
    }
}

/// A webmention.io-style jf2 entry.
pub(crate) fn entry(source: &str, target: &str, kind: &str, published: &str, received: &str) -> Value {
    json!({
        "type": "entry",
        "wm-source": source,
        "wm-target": target,
        "wm-property": kind,
        "published": published,
        "wm-received": received,
        "url": source,
        "content": {"html": format!("<p>{kind} from {source}</p>"), "text": format!("{kind} from {source}")},
    })
}

/// A feed body holding `entries` under the default key.
pub(crate) fn page(entries: Vec<Value>) -> Result<Value, Error> {
    Ok(json!({ "type": "feed", "name": "Webmentions", "children": entries }))
}

/// Options for a single-request feed with no throttle.
pub(crate) fn options() -> SyncOptions {
    SyncOptions {
        domain: "https://example.com".into(),
        feed: "https://mentions.example/api/feed.jf2?token=secret".into(),
        pagination: Pagination::Single,
        throttle_ms: 0,
        ..Default::default()
    }
}

/// Options for a paged feed of `per_page` records with no throttle.
pub(crate) fn paged_options(per_page: usize) -> SyncOptions {
    SyncOptions {
        feed: format!("https://webmention.io/api/mentions.jf2?token=secret&per-page={per_page}"),
        pagination: Pagination::Auto,
        ..options()
    }
}
