//! Client code for the mention cache.
//!
//! This crate provides the feed transport, the incremental sync engine,
//! grouping and rendering of mentions, and the template host integration
//! shared by the server and any embedding site generator.

pub mod fetch;
pub mod integration;
pub mod pipeline;
pub mod query;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{FeedClient, FeedTransport, FetchConfig};
pub use integration::{Filter, TemplateHost, register};
pub use pipeline::Pipeline;
pub use query::{MentionsByUrl, RenderedMention};
pub use sync::SyncEngine;
