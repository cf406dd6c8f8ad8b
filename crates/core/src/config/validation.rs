//! Configuration validation rules.
//!
//! This module provides validation logic for `SyncOptions` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::SyncOptions;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl SyncOptions {
    /// Validate option values. Runs before any cache or network access.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `domain`, `feed` or `key` is empty, and
    /// `ConfigError::Invalid` if:
    /// - `domain` or `feed` is not an http(s) URL
    /// - `duration` is not a recognised window
    /// - `per_page` is 0
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(&self.domain, "domain", "Set MENTIONS_DOMAIN to your site origin")?;
        require(&self.feed, "feed", "Set MENTIONS_FEED to the mention feed endpoint")?;
        require(&self.key, "key", "Set MENTIONS_KEY to the response key holding mentions")?;

        http_url(&self.domain, "domain")?;
        http_url(&self.feed, "feed")?;

        self.staleness()?;

        if self.per_page == 0 {
            return Err(ConfigError::Invalid { field: "per_page".into(), reason: "must be greater than 0".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if !self.allowlist.is_empty() && !self.blocklist.is_empty() {
            tracing::warn!(
                allowlist_count = self.allowlist.len(),
                blocklist_count = self.blocklist.len(),
                "Both allowlist and blocklist are set; \
                 blocklist is applied first"
            );
        }

        Ok(())
    }
}

fn require(value: &str, field: &str, hint: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing { field: field.into(), hint: hint.into() });
    }
    Ok(())
}

fn http_url(value: &str, field: &str) -> Result<(), ConfigError> {
    let parsed =
        url::Url::parse(value).map_err(|e| ConfigError::Invalid { field: field.into(), reason: e.to_string() })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::Invalid { field: field.into(), reason: format!("unsupported scheme: {scheme}") }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SyncOptions {
        SyncOptions {
            domain: "https://example.com".into(),
            feed: "https://webmention.io/api/mentions.jf2?domain=example.com&token=t".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_minimal_options() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_default_is_missing_domain() {
        let result = SyncOptions::default().validate();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "domain"));
    }

    #[test]
    fn test_validate_missing_feed() {
        let options = SyncOptions { feed: String::new(), ..valid() };
        assert!(matches!(options.validate(), Err(ConfigError::Missing { field, .. }) if field == "feed"));
    }

    #[test]
    fn test_validate_missing_key() {
        let options = SyncOptions { key: " ".into(), ..valid() };
        assert!(matches!(options.validate(), Err(ConfigError::Missing { field, .. }) if field == "key"));
    }

    #[test]
    fn test_validate_relative_feed() {
        let options = SyncOptions { feed: "/mentions.json".into(), ..valid() };
        assert!(matches!(options.validate(), Err(ConfigError::Invalid { field, .. }) if field == "feed"));
    }

    #[test]
    fn test_validate_unsupported_scheme() {
        let options = SyncOptions { feed: "ftp://example.com/mentions.json".into(), ..valid() };
        assert!(matches!(options.validate(), Err(ConfigError::Invalid { field, .. }) if field == "feed"));
    }

    #[test]
    fn test_validate_bad_duration() {
        let options = SyncOptions { duration: "soon".into(), ..valid() };
        assert!(matches!(options.validate(), Err(ConfigError::Invalid { field, .. }) if field == "duration"));
    }

    #[test]
    fn test_validate_zero_per_page() {
        let options = SyncOptions { per_page: 0, ..valid() };
        assert!(matches!(options.validate(), Err(ConfigError::Invalid { field, .. }) if field == "per_page"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let options = SyncOptions { timeout_ms: 50, ..valid() };
        assert!(matches!(options.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let options = SyncOptions { timeout_ms: 301_000, ..valid() };
        assert!(matches!(options.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let options = SyncOptions { timeout_ms: 100, ..valid() };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let options = SyncOptions { user_agent: String::new(), ..valid() };
        assert!(matches!(options.validate(), Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }
}
