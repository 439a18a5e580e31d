//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with the crawler's user agent
//! - GET requests bounded by the session's per-request timeout
//! - Content-Type checks (only HTML is extracted)
//! - Error classification into per-page failure reasons

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::{header, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for one page
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects; relative links resolve against it
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// No complete response within the per-request timeout
    Timeout {
        /// The timeout that elapsed
        after: Duration,
    },

    /// Network error (connection refused, DNS, TLS, body read, redirect loop)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns true if the page body is available for extraction
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }

    /// Human-readable reason recorded on the page's `Article` when the fetch failed
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            FetchResult::Success { .. } => None,
            FetchResult::ContentMismatch { content_type } => {
                Some(format!("Unsupported content type: {}", content_type))
            }
            FetchResult::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            FetchResult::Timeout { after } => {
                Some(format!("Timeout after {} ms", after.as_millis()))
            }
            FetchResult::NetworkError { error } => Some(format!("Network error: {}", error)),
        }
    }
}

/// Formats the user agent string: `Name/Version` or `Name/Version (+ContactURL)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    match &config.contact_url {
        Some(contact) => format!(
            "{}/{} (+{})",
            config.crawler_name, config.crawler_version, contact
        ),
        None => format!("{}/{}", config.crawler_name, config.crawler_version),
    }
}

/// Builds an HTTP client with proper configuration
///
/// The client is shared by every fetch of every session. The overall request
/// timeout is not set here; each session applies its own per-request timeout.
///
/// # Example
///
/// ```no_run
/// use skein::config::{CrawlerConfig, UserAgentConfig};
/// use skein::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(user_agent))
        .connect_timeout(Duration::from_millis(crawler.connect_timeout))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// # Outcomes
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with HTML (or missing) Content-Type | `Success` |
/// | 2xx with any other Content-Type | `ContentMismatch` |
/// | Non-2xx after redirects | `HttpError` |
/// | Timeout elapsed (connect, headers or body) | `Timeout` |
/// | Anything else | `NetworkError` |
///
/// There are no retries: a failed fetch ends that page.
pub async fn fetch_url(client: &Client, url: &Url, timeout: Duration) -> FetchResult {
    let response = match client.get(url.clone()).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e, timeout),
    };

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    // Check Content-Type
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    if let Some(content_type) = content_type {
        if !is_html_content_type(&content_type) {
            return FetchResult::ContentMismatch { content_type };
        }
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => classify_error(e, timeout),
    }
}

/// Returns true for `text/html` and `application/xhtml+xml`, ignoring parameters
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

fn classify_error(error: reqwest::Error, timeout: Duration) -> FetchResult {
    if error.is_timeout() {
        FetchResult::Timeout { after: timeout }
    } else if error.is_connect() {
        FetchResult::NetworkError {
            error: "Connection refused".to_string(),
        }
    } else if error.is_redirect() {
        FetchResult::NetworkError {
            error: "Too many redirects".to_string(),
        }
    } else {
        FetchResult::NetworkError {
            error: error.to_string(),
        }
    }
}
