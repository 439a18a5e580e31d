use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use url::Url;

/// Raw crawl request as sent by a client
///
/// Every field except `url` is optional; a request carrying only `url` is a
/// "simple" request and receives the defaults in full.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlRequest {
    /// Start URL
    pub url: String,

    #[serde(
        default,
        deserialize_with = "saturating_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_depth: Option<i64>,

    #[serde(
        default,
        deserialize_with = "saturating_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_pages: Option<i64>,

    /// CSS selector for nodes carrying outbound links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_pattern: Option<String>,

    /// CSS selector for the node carrying the page content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_css: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_domain: Option<bool>,

    /// Per-request timeout in milliseconds
    #[serde(
        default,
        deserialize_with = "saturating_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<i64>,

    /// Only follow URLs matching this regex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_regex: Option<String>,

    /// Never follow URLs matching this regex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_regex: Option<String>,
}

/// Reads any JSON number into an `i64`, saturating at the bounds
///
/// Floats are truncated and out-of-range integers saturate, so the normalizer
/// always gets a value to clamp instead of the request failing to decode.
fn saturating_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(number.map(|n| {
        n.as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(i64::MAX)
    }))
}

impl CrawlRequest {
    /// Creates a simple request: only the start URL, defaults for everything else
    pub fn simple(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Returns true if no advanced field is set
    pub fn is_simple(&self) -> bool {
        self.max_depth.is_none()
            && self.max_pages.is_none()
            && self.match_pattern.is_none()
            && self.content_css.is_none()
            && self.same_domain.is_none()
            && self.timeout.is_none()
            && self.url_regex.is_none()
            && self.exclude_regex.is_none()
    }
}

/// Canonical, validated configuration for one crawl session
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Canonical start URL
    pub start_url: Url,

    /// Maximum link distance from the start URL (start = 0)
    pub max_depth: u32,

    /// Maximum number of pages fetched in the session
    pub max_pages: usize,

    pub link_selector: String,

    pub content_selector: String,

    pub same_domain_only: bool,

    pub per_request_timeout: Duration,

    pub include_pattern: Option<Regex>,

    pub exclude_pattern: Option<Regex>,
}

impl CrawlConfig {
    /// The only host the session may visit, when same-domain crawling is on
    pub fn allowed_host(&self) -> Option<&str> {
        if self.same_domain_only {
            self.start_url.host_str()
        } else {
            None
        }
    }
}

/// Process-level configuration loaded from an optional TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Socket address to bind, e.g. "127.0.0.1:8000"
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Crawler resource configuration shared by every session
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Upper bound on in-flight fetches per session
    #[serde(rename = "max-concurrent-fetches", default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: u32,

    /// TCP connect timeout (milliseconds)
    #[serde(rename = "connect-timeout", default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_max_concurrent_fetches() -> u32 {
    10
}

fn default_connect_timeout() -> u64 {
    10_000
}

fn default_crawler_name() -> String {
    "Skein".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
