//! Sync options with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MENTIONS_*)
//! 2. TOML config file (if MENTIONS_CONFIG_FILE set)
//! 3. Built-in defaults

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod duration;
mod validation;

pub use duration::parse_duration;
pub use validation::ConfigError;

/// File name of the SQLite cache inside `cache_directory`.
pub const CACHE_FILE_NAME: &str = "mentions-cache.sqlite";

/// Options for one sync/query run. Built once, never mutated.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MENTIONS_*)
/// 2. TOML config file (if MENTIONS_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Site origin, e.g. `https://example.com`. Required.
    #[serde(default)]
    pub domain: String,

    /// Feed endpoint, including any token and `per-page` parameter. Required.
    #[serde(default)]
    pub feed: String,

    /// Key naming the record array in the feed's JSON body.
    #[serde(default = "default_key")]
    pub key: String,

    /// Cache identifier. Falls back to `webmentions-<host>`.
    #[serde(default)]
    pub unique_key: Option<String>,

    /// Directory holding the SQLite cache file.
    #[serde(default = "default_cache_directory")]
    pub cache_directory: PathBuf,

    /// Staleness window, e.g. `1d`, `12h`, `*`.
    #[serde(default = "default_duration")]
    pub duration: String,

    /// Force a network round trip even when the cache is fresh.
    #[serde(default)]
    pub refresh: bool,

    /// Source URL prefixes to keep. Empty keeps everything.
    #[serde(default)]
    pub allowlist: Vec<String>,

    /// Source URL prefixes to drop.
    #[serde(default)]
    pub blocklist: Vec<String>,

    /// Literal find/replace rules applied to targets, in order.
    #[serde(default)]
    pub url_replacements: Vec<UrlRewrite>,

    /// Tags and attributes that survive sanitization.
    #[serde(default)]
    pub allowed_html: HtmlPolicy,

    /// Raw content longer than this is summarized instead of rendered.
    #[serde(default = "default_maximum_html_length")]
    pub maximum_html_length: usize,

    /// Phrase used in place of oversized content.
    #[serde(default = "default_maximum_html_text")]
    pub maximum_html_text: String,

    /// Whether the feed is walked page by page.
    #[serde(default)]
    pub pagination: Pagination,

    /// Page size used when the feed URL has no `per-page` parameter.
    #[serde(default = "default_per_page")]
    pub per_page: usize,

    /// Delay between page requests in milliseconds.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent string for feed requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// One literal target rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRewrite {
    pub from: String,
    pub to: String,
}

/// Sanitizer allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlPolicy {
    #[serde(default)]
    pub tags: Vec<String>,
    /// Allowed attributes, keyed by tag name.
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl Default for HtmlPolicy {
    fn default() -> Self {
        Self {
            tags: ["a", "b", "em", "i", "strong"].into_iter().map(String::from).collect(),
            attributes: BTreeMap::from([("a".to_string(), vec!["href".to_string()])]),
        }
    }
}

/// How the feed endpoint is paged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pagination {
    /// Paged when the feed host is webmention.io.
    #[default]
    Auto,
    Paged,
    Single,
}

fn default_key() -> String {
    "children".into()
}

fn default_cache_directory() -> PathBuf {
    PathBuf::from(".cache")
}

fn default_duration() -> String {
    "1d".into()
}

fn default_maximum_html_length() -> usize {
    1000
}

fn default_maximum_html_text() -> String {
    "mentioned this in".into()
}

fn default_per_page() -> usize {
    1000
}

fn default_throttle_ms() -> u64 {
    1000
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_user_agent() -> String {
    "mentions-cache/0.1".into()
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            domain: String::new(),
            feed: String::new(),
            key: default_key(),
            unique_key: None,
            cache_directory: default_cache_directory(),
            duration: default_duration(),
            refresh: false,
            allowlist: Vec::new(),
            blocklist: Vec::new(),
            url_replacements: Vec::new(),
            allowed_html: HtmlPolicy::default(),
            maximum_html_length: default_maximum_html_length(),
            maximum_html_text: default_maximum_html_text(),
            pagination: Pagination::Auto,
            per_page: default_per_page(),
            throttle_ms: default_throttle_ms(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl SyncOptions {
    /// Load options from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `MENTIONS_`
    /// 2. TOML file from `MENTIONS_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MENTIONS_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("MENTIONS_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let options: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        options.validate()?;

        Ok(options)
    }

    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay between page requests.
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Parsed staleness window.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `duration` is not a recognised window.
    pub fn staleness(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.duration)
            .ok_or_else(|| ConfigError::Invalid { field: "duration".into(), reason: format!("unrecognised window `{}`", self.duration) })
    }

    /// Host part of `domain`, or `domain` itself when it carries no scheme.
    pub fn domain_host(&self) -> String {
        host_of(&self.domain)
    }

    /// Host part of `feed`, for log lines that must not leak the token.
    pub fn feed_host(&self) -> String {
        host_of(&self.feed)
    }

    /// Key under which the mention set is cached.
    pub fn cache_key(&self) -> String {
        match self.unique_key.as_deref() {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => format!("webmentions-{}", self.domain_host()),
        }
    }

    /// Full path of the SQLite cache file.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_directory.join(CACHE_FILE_NAME)
    }
}

fn host_of(value: &str) -> String {
    if value.contains("//")
        && let Ok(parsed) = url::Url::parse(value)
        && let Some(host) = parsed.host_str()
    {
        return host.to_string();
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = SyncOptions::default();
        assert_eq!(options.key, "children");
        assert_eq!(options.duration, "1d");
        assert_eq!(options.cache_directory, PathBuf::from(".cache"));
        assert_eq!(options.maximum_html_length, 1000);
        assert_eq!(options.maximum_html_text, "mentioned this in");
        assert_eq!(options.pagination, Pagination::Auto);
        assert_eq!(options.per_page, 1000);
        assert!(!options.refresh);
        assert!(options.allowlist.is_empty());
        assert!(options.blocklist.is_empty());
        assert!(options.url_replacements.is_empty());
        assert_eq!(options.allowed_html.tags, vec!["a", "b", "em", "i", "strong"]);
        assert_eq!(options.allowed_html.attributes.get("a"), Some(&vec!["href".to_string()]));
    }

    #[test]
    fn test_durations() {
        let options = SyncOptions::default();
        assert_eq!(options.timeout(), Duration::from_millis(20_000));
        assert_eq!(options.throttle(), Duration::from_secs(1));
        assert_eq!(options.staleness().unwrap(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_cache_key_falls_back_to_host() {
        let options = SyncOptions { domain: "https://example.com".into(), ..Default::default() };
        assert_eq!(options.cache_key(), "webmentions-example.com");

        let options = SyncOptions { unique_key: Some("mine".into()), ..options };
        assert_eq!(options.cache_key(), "mine");
    }

    #[test]
    fn test_hosts() {
        let options = SyncOptions {
            domain: "example.com".into(),
            feed: "https://webmention.io/api/mentions.jf2?token=secret".into(),
            ..Default::default()
        };
        assert_eq!(options.domain_host(), "example.com");
        assert_eq!(options.feed_host(), "webmention.io");
    }

    #[test]
    fn test_cache_path() {
        let options = SyncOptions { cache_directory: PathBuf::from("/tmp/site"), ..Default::default() };
        assert_eq!(options.cache_path(), PathBuf::from("/tmp/site/mentions-cache.sqlite"));
    }

    #[test]
    fn test_load_layers_file_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "mentions.toml",
                r#"
                domain = "https://example.com"
                feed = "https://example.com/mentions.json"
                duration = "2h"
                blocklist = ["https://spam.example"]

                [[url_replacements]]
                from = "http://"
                to = "https://"
                "#,
            )?;
            jail.set_env("MENTIONS_CONFIG_FILE", "mentions.toml");
            jail.set_env("MENTIONS_DURATION", "30m");
            jail.set_env("MENTIONS_REFRESH", "true");

            let options = SyncOptions::load().map_err(|e| e.to_string())?;
            assert_eq!(options.domain, "https://example.com");
            assert_eq!(options.duration, "30m");
            assert!(options.refresh);
            assert_eq!(options.blocklist, vec!["https://spam.example"]);
            assert_eq!(options.url_replacements, vec![UrlRewrite { from: "http://".into(), to: "https://".into() }]);
            Ok(())
        });
    }

    #[test]
    fn test_load_requires_domain() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MENTIONS_FEED", "https://example.com/mentions.json");
            let result = SyncOptions::load();
            assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "domain"));
            Ok(())
        });
    }
}
