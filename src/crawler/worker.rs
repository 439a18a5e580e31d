//! Fetch/extract task run once per dequeued frontier entry

use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::frontier::FrontierEntry;
use crate::crawler::parser::PageExtractor;
use crate::protocol::Article;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// What one fetch task hands back to its session
#[derive(Debug, Clone)]
pub struct PageOutcome {
    /// The entry that was processed
    pub entry: FrontierEntry,

    /// Exactly one article, successful or failed
    pub article: Article,
}

/// Everything a fetch task needs, cheap to clone into each task
#[derive(Clone)]
pub struct PageWorker {
    client: Client,
    extractor: Arc<PageExtractor>,
    timeout: Duration,
}

impl PageWorker {
    pub fn new(client: Client, extractor: PageExtractor, timeout: Duration) -> Self {
        Self {
            client,
            extractor: Arc::new(extractor),
            timeout,
        }
    }

    /// Fetches one page and turns the result into an `Article`
    ///
    /// Never fails: fetch and parse problems are recorded on the article.
    /// Links are not offered to the frontier here; the session does that.
    pub async fn process(self, entry: FrontierEntry) -> PageOutcome {
        debug!("Fetching {} (depth {})", entry.url, entry.depth);

        let fetched = fetch_url(&self.client, &entry.url, self.timeout).await;

        let article = match fetched {
            FetchResult::Success {
                final_url, body, ..
            } => {
                // Parsing is synchronous; the document never lives across an await
                let parsed = self.extractor.parse(&body, &final_url);
                debug!(
                    "Extracted {} links and {} chars from {}",
                    parsed.links.len(),
                    parsed.content.len(),
                    entry.url
                );
                Article {
                    url: entry.url.to_string(),
                    title: parsed.title,
                    content: parsed.content,
                    links: parsed.links,
                    error: None,
                }
            }
            failure => {
                let reason = failure
                    .failure_reason()
                    .unwrap_or_else(|| "Unknown fetch failure".to_string());
                warn!("Failed to fetch {}: {}", entry.url, reason);
                Article::failed(entry.url.as_str(), reason)
            }
        };

        PageOutcome { entry, article }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, UserAgentConfig};
    use crate::crawler::fetcher::build_http_client;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn worker(timeout: Duration) -> PageWorker {
        let client =
            build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
        PageWorker::new(client, PageExtractor::new("a", "body").unwrap(), timeout)
    }

    fn entry(url: String, depth: u32) -> FrontierEntry {
        FrontierEntry {
            url: Url::parse(&url).unwrap(),
            depth,
        }
    }

    #[tokio::test]
    async fn test_successful_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"<html><head><title>Home</title></head>
                   <body><div>Welcome</div><a href="/a">A</a><a href="https://other.org/">O</a></body></html>"#,
                "text/html",
            ))
            .mount(&server)
            .await;

        let outcome = worker(Duration::from_secs(5))
            .process(entry(format!("{}/", server.uri()), 0))
            .await;

        assert!(!outcome.article.is_error());
        assert_eq!(outcome.entry.depth, 0);
        assert_eq!(outcome.article.title.as_deref(), Some("Home"));
        assert!(outcome.article.content.contains("Welcome"));
        assert_eq!(
            outcome.article.links,
            vec![format!("{}/a", server.uri()), "https://other.org/".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_page_records_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let outcome = worker(Duration::from_secs(5))
            .process(entry(format!("{}/down", server.uri()), 1))
            .await;

        assert!(outcome.article.is_error());
        assert_eq!(outcome.article.error.as_deref(), Some("HTTP 503"));
        assert!(outcome.article.content.is_empty());
        assert!(outcome.article.links.is_empty());
    }
}
