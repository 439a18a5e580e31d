//! Config Normalizer: raw `CrawlRequest` in, canonical `CrawlConfig` out

use crate::config::types::{CrawlConfig, CrawlRequest};
use crate::url::{canonicalize_url, compile_pattern};
use crate::ConfigError;
use scraper::Selector;
use std::time::Duration;

/// Hard limits applied to every request regardless of what the caller asks for
pub const DEPTH_RANGE: (u32, u32) = (1, 5);
pub const PAGES_RANGE: (usize, usize) = (1, 100);
pub const TIMEOUT_RANGE_MS: (u64, u64) = (1_000, 120_000);

pub const DEFAULT_MAX_DEPTH: u32 = 2;
pub const DEFAULT_MAX_PAGES: usize = 10;
pub const DEFAULT_LINK_SELECTOR: &str = "a";
pub const DEFAULT_CONTENT_SELECTOR: &str = "body";
pub const DEFAULT_SAME_DOMAIN: bool = true;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Normalizes a raw request into a canonical crawl configuration
///
/// Missing fields receive defaults, numeric bounds are clamped into the hard
/// limits, and blank strings count as missing.
///
/// # Errors
///
/// * `ConfigError::InvalidUrl` - the start URL is not an absolute HTTP(S) URL
/// * `ConfigError::InvalidPattern` - an include/exclude regex does not compile
/// * `ConfigError::InvalidSelector` - a CSS selector does not parse
///
/// # Example
///
/// ```
/// use skein::config::{normalize_request, CrawlRequest};
///
/// let config = normalize_request(&CrawlRequest::simple("https://example.com")).unwrap();
/// assert_eq!(config.max_depth, 2);
/// assert_eq!(config.max_pages, 10);
/// assert!(config.same_domain_only);
/// ```
pub fn normalize_request(request: &CrawlRequest) -> Result<CrawlConfig, ConfigError> {
    let start_url =
        canonicalize_url(&request.url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

    let max_depth = request
        .max_depth
        .map(|d| clamp_i64(d, DEPTH_RANGE.0 as u64, DEPTH_RANGE.1 as u64) as u32)
        .unwrap_or(DEFAULT_MAX_DEPTH);

    let max_pages = request
        .max_pages
        .map(|p| clamp_i64(p, PAGES_RANGE.0 as u64, PAGES_RANGE.1 as u64) as usize)
        .unwrap_or(DEFAULT_MAX_PAGES);

    let timeout_ms = request
        .timeout
        .map(|t| clamp_i64(t, TIMEOUT_RANGE_MS.0, TIMEOUT_RANGE_MS.1))
        .unwrap_or(DEFAULT_TIMEOUT_MS);

    let link_selector = selector_or_default(request.match_pattern.as_deref(), DEFAULT_LINK_SELECTOR)?;
    let content_selector =
        selector_or_default(request.content_css.as_deref(), DEFAULT_CONTENT_SELECTOR)?;

    let include_pattern = non_blank(request.url_regex.as_deref())
        .map(compile_pattern)
        .transpose()?;
    let exclude_pattern = non_blank(request.exclude_regex.as_deref())
        .map(compile_pattern)
        .transpose()?;

    Ok(CrawlConfig {
        start_url,
        max_depth,
        max_pages,
        link_selector,
        content_selector,
        same_domain_only: request.same_domain.unwrap_or(DEFAULT_SAME_DOMAIN),
        per_request_timeout: Duration::from_millis(timeout_ms),
        include_pattern,
        exclude_pattern,
    })
}

fn clamp_i64(value: i64, min: u64, max: u64) -> u64 {
    if value < 0 {
        min
    } else {
        (value as u64).clamp(min, max)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn selector_or_default(value: Option<&str>, default: &str) -> Result<String, ConfigError> {
    let selector = non_blank(value).unwrap_or(default);
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))?;
    Ok(selector.to_string())
}
