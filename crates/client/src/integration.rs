//! Template host integration.
//!
//! Registers the mention data and a set of JSON-in, JSON-out filters with any
//! host implementing [`TemplateHost`]. Accessor filters accept records in any
//! known upstream shape as well as canonical and rendered ones.

use std::sync::Arc;

use mentions_core::record::RawRecord;
use mentions_core::{Error, MentionRecord, SyncOptions};
use serde_json::Value;

use crate::pipeline::Pipeline;
use crate::query::query;

/// A template filter: the piped value plus any extra arguments.
pub type Filter = Arc<dyn Fn(&Value, &[Value]) -> Value + Send + Sync>;

/// Global data `webmentions_all`: every mention, newest first.
pub const DATA_ALL: &str = "webmentions_all";
/// Global data `webmentions_by_url`: mentions keyed by normalized target.
pub const DATA_BY_URL: &str = "webmentions_by_url";
/// Global data `webmentions_defaults`: the built-in option defaults.
pub const DATA_DEFAULTS: &str = "webmentions_defaults";
/// Global data `webmentions_options`: the options this pipeline runs with.
pub const DATA_OPTIONS: &str = "webmentions_options";

/// The slice of a template engine this crate needs.
pub trait TemplateHost {
    fn add_global_data(&mut self, name: &str, value: Value);
    fn add_filter(&mut self, name: &str, filter: Filter);
}

/// Synchronize once and register all data and filters with `host`.
pub async fn register<H: TemplateHost + ?Sized>(host: &mut H, pipeline: &Pipeline) -> Result<(), Error> {
    let all = pipeline.all().await?;
    let grouped = pipeline.by_url().await?;

    host.add_global_data(DATA_ALL, MentionRecord::to_array(&all));
    host.add_global_data(DATA_BY_URL, serde_json::to_value(&*grouped)?);
    host.add_global_data(DATA_DEFAULTS, serde_json::to_value(SyncOptions::default())?);
    host.add_global_data(DATA_OPTIONS, serde_json::to_value(pipeline.options())?);

    let options = Arc::new(pipeline.options().clone());
    let by_url = Arc::clone(&grouped);
    host.add_filter(
        "get_webmentions",
        Arc::new(move |url: &Value, args: &[Value]| {
            let Some(url) = url.as_str() else {
                return Value::Array(Vec::new());
            };
            match query(&options, &by_url, url, &string_args(args)) {
                Ok(rendered) => serde_json::to_value(rendered).unwrap_or_else(|_| Value::Array(Vec::new())),
                Err(e) => {
                    tracing::warn!(url, error = %e, "get_webmentions failed");
                    Value::Array(Vec::new())
                }
            }
        }),
    );

    host.add_filter("webmentions_by_type", Arc::new(filter_by_types));
    host.add_filter("webmentions_by_types", Arc::new(filter_by_types));

    host.add_filter("webmention_published", accessor(|r| r.published().map(String::from)));
    host.add_filter("webmention_received", accessor(|r| r.received().map(String::from)));
    host.add_filter("webmention_content", accessor(|r| r.content().map(String::from)));
    host.add_filter("webmention_source", accessor(|r| r.source().map(String::from)));
    host.add_filter("webmention_url", accessor(|r| r.origin_url().map(String::from)));
    host.add_filter("webmention_target", accessor(|r| r.target().map(String::from)));
    host.add_filter("webmention_type", accessor(|r| r.kind().map(String::from)));

    tracing::debug!(records = all.len(), targets = grouped.len(), "registered mention data and filters");
    Ok(())
}

fn accessor(get: fn(&RawRecord) -> Option<String>) -> Filter {
    Arc::new(move |record: &Value, _: &[Value]| get(&raw(record)).map_or(Value::Null, Value::String))
}

fn raw(value: &Value) -> RawRecord {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

/// Keep the elements of `records` whose type is among the string arguments.
///
/// Elements pass through untouched, so rendered fields survive.
fn filter_by_types(records: &Value, args: &[Value]) -> Value {
    let types = string_args(args);
    let Some(records) = records.as_array() else {
        return Value::Array(Vec::new());
    };

    records
        .iter()
        .filter(|record| raw(record).kind().is_some_and(|kind| types.iter().any(|t| t == kind)))
        .cloned()
        .collect()
}

/// Strings among `args`, with arrays flattened one level.
fn string_args(args: &[Value]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| match arg {
            Value::Array(items) => items.iter().filter_map(Value::as_str).map(String::from).collect(),
            Value::String(s) => vec![s.clone()],
            _ => Vec::new(),
        })
        .collect()
}
