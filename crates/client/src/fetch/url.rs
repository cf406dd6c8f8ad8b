//! Feed URL construction: parsing, the `since` cursor and page parameters.

use mentions_core::Pagination;
use url::Url;

/// Host whose feed is walked page by page under `Pagination::Auto`.
pub const PAGED_FEED_HOST: &str = "webmention.io";

/// Error type for feed URL parsing failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for mentions_core::Error {
    fn from(err: UrlError) -> Self {
        mentions_core::Error::InvalidUrl(err.to_string())
    }
}

/// Parse a feed endpoint.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Require an http(s) scheme
/// 3. Remove fragment (#...)
/// 4. Keep query string intact, token included
pub fn parse_feed(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Append the `since` cursor, if any.
pub fn with_since(feed: &Url, since: Option<&str>) -> Url {
    let mut url = feed.clone();
    if let Some(since) = since.filter(|s| !s.is_empty()) {
        url.query_pairs_mut().append_pair("since", since);
    }
    url
}

/// Whether `feed` should be walked page by page.
pub fn is_paginated(feed: &Url, mode: Pagination) -> bool {
    match mode {
        Pagination::Paged => true,
        Pagination::Single => false,
        Pagination::Auto => feed.host_str().is_some_and(|h| h.eq_ignore_ascii_case(PAGED_FEED_HOST)),
    }
}

/// Split the page size out of `url`.
///
/// Returns the URL without any `per-page` parameter and the page size it
/// carried, or `default_per_page` when absent, zero or unparsable.
pub fn paged_base(url: &Url, default_per_page: usize) -> (Url, usize) {
    let mut per_page = None;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter_map(|(k, v)| {
            if k == "per-page" {
                per_page = v.parse::<usize>().ok().filter(|n| *n > 0).or(per_page);
                None
            } else {
                Some((k.into_owned(), v.into_owned()))
            }
        })
        .collect();

    let mut base = url.clone();
    if kept.is_empty() {
        base.set_query(None);
    } else {
        base.query_pairs_mut().clear().extend_pairs(kept);
    }

    (base, per_page.unwrap_or(default_per_page))
}

/// URL of page `page` (zero-based) of size `per_page`.
pub fn page_url(base: &Url, per_page: usize, page: usize) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("per-page", &per_page.to_string())
        .append_pair("page", &page.to_string());
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(s: &str) -> Url {
        parse_feed(s).unwrap()
    }

    #[test]
    fn test_parse_feed_basic() {
        let url = feed("  https://webmention.io/api/mentions.jf2?token=abc#frag ");
        assert_eq!(url.host_str(), Some("webmention.io"));
        assert_eq!(url.query(), Some("token=abc"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_parse_feed_errors() {
        assert!(matches!(parse_feed(""), Err(UrlError::Empty)));
        assert!(matches!(parse_feed("   "), Err(UrlError::Empty)));
        assert!(matches!(parse_feed("file:///etc/passwd"), Err(UrlError::UnsupportedScheme(_))));
        assert!(matches!(parse_feed("not a url"), Err(UrlError::InvalidUrl(_))));
    }

    #[test]
    fn test_with_since_respects_existing_query() {
        let with_query = with_since(&feed("https://a.example/feed?token=t"), Some("2024-01-01T00:00:00Z"));
        assert_eq!(with_query.as_str(), "https://a.example/feed?token=t&since=2024-01-01T00%3A00%3A00Z");

        let bare = with_since(&feed("https://a.example/feed"), Some("2024"));
        assert_eq!(bare.as_str(), "https://a.example/feed?since=2024");
    }

    #[test]
    fn test_with_since_absent() {
        let url = feed("https://a.example/feed?token=t");
        assert_eq!(with_since(&url, None), url);
        assert_eq!(with_since(&url, Some("")), url);
    }

    #[test]
    fn test_is_paginated() {
        let wm = feed("https://webmention.io/api/mentions.jf2");
        let other = feed("https://mentions.example/feed.json");

        assert!(is_paginated(&wm, Pagination::Auto));
        assert!(!is_paginated(&other, Pagination::Auto));
        assert!(is_paginated(&other, Pagination::Paged));
        assert!(!is_paginated(&wm, Pagination::Single));
    }

    #[test]
    fn test_paged_base_extracts_per_page() {
        let (base, per_page) = paged_base(&feed("https://webmention.io/api?token=t&per-page=50&since=x"), 1000);
        assert_eq!(per_page, 50);
        assert_eq!(base.query(), Some("token=t&since=x"));
    }

    #[test]
    fn test_paged_base_defaults() {
        let (base, per_page) = paged_base(&feed("https://webmention.io/api?per-page=zero"), 1000);
        assert_eq!(per_page, 1000);
        assert_eq!(base.query(), None);

        let (_, per_page) = paged_base(&feed("https://webmention.io/api?per-page=0"), 25);
        assert_eq!(per_page, 25);
    }

    #[test]
    fn test_page_url() {
        let base = feed("https://webmention.io/api?token=t");
        assert_eq!(page_url(&base, 2, 3).as_str(), "https://webmention.io/api?token=t&per-page=2&page=3");

        let bare = feed("https://webmention.io/api");
        assert_eq!(page_url(&bare, 10, 0).as_str(), "https://webmention.io/api?per-page=10&page=0");
    }
}
