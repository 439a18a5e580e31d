//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching bounded by a per-request timeout
//! - HTML parsing: title, readable content and link extraction
//! - The breadth-first frontier with its visited set and enqueue filters
//! - Fetch/extract tasks and the session that orchestrates them

mod fetcher;
mod frontier;
mod parser;
mod session;
mod worker;

pub use fetcher::{build_http_client, fetch_url, is_html_content_type, user_agent_string, FetchResult};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{resolve_link, visible_text, PageExtractor, ParsedPage};
pub use session::{spawn_session, CrawlSession, SessionHandle, SessionOptions, SessionReport};
pub use worker::{PageOutcome, PageWorker};

use crate::config::{CrawlConfig, ServerConfig};
use crate::SkeinError;

/// Runs a complete crawl session in-process and returns its report
///
/// This is the entry point for embedding callers that do not need the event
/// stream. Events are drained and discarded.
///
/// # Returns
///
/// * `Ok(SessionReport)` - The session ended (completed, failed or cancelled)
/// * `Err(SkeinError)` - The session could not be started
pub async fn crawl(config: CrawlConfig, server: &ServerConfig) -> Result<SessionReport, SkeinError> {
    let client = build_http_client(&server.user_agent, &server.crawler)?;
    let SessionHandle {
        mut events, task, ..
    } = spawn_session(config, client, SessionOptions::from(&server.crawler))?;

    while events.recv().await.is_some() {}

    task.await
        .map_err(|e| SkeinError::SessionFailure(format!("session task failed: {}", e)))
}
