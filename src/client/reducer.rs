//! Client session state machine
//!
//! Derived state is rebuilt from the event log alone: [`reduce`] is a pure
//! function of the previous state and one event, so replaying the same events
//! always yields the same state.

use crate::protocol::{Article, ProtocolEvent};

/// Where the crawl stands from the client's point of view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlPhase {
    /// Request sent, no terminal event yet
    Running,

    /// `complete` received; results are populated
    Completed,

    /// Terminal `error` received, or the transport dropped
    Failed(String),

    /// The client cancelled
    Cancelled,
}

impl CrawlPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CrawlPhase::Running)
    }
}

/// Progress bar position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

/// UI-facing state of one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientState {
    pub status: String,
    pub progress: Option<Progress>,
    /// Only ever populated by `complete`
    pub results: Vec<Article>,
    /// Human-readable history, oldest first
    pub log: Vec<String>,
    pub phase: CrawlPhase,
}

impl ClientState {
    /// State right after the request was sent
    pub fn starting(url: &str) -> Self {
        Self {
            status: "Connecting...".to_string(),
            progress: None,
            results: Vec::new(),
            log: vec![format!("Starting crawl for {}", url)],
            phase: CrawlPhase::Running,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Number of completed pages that carry an error
    pub fn failed_pages(&self) -> usize {
        self.results.iter().filter(|a| a.is_error()).count()
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::starting("")
    }
}

/// Applies one event
///
/// Events arriving after a terminal state are ignored.
pub fn reduce(mut state: ClientState, event: &ProtocolEvent) -> ClientState {
    if state.is_terminal() {
        return state;
    }

    match event {
        ProtocolEvent::Status { message } => {
            state.status = message.clone();
            state.log.push(format!("Status: {}", message));
        }
        ProtocolEvent::Found { message, count } => {
            state.status = message.clone();
            state.progress = Some(Progress {
                current: 0,
                total: *count,
            });
            state.log.push(format!("Found {} initial links.", count));
        }
        ProtocolEvent::Progress {
            current,
            total,
            last_scraped,
        } => {
            state.progress = Some(Progress {
                current: *current,
                total: *total,
            });
            state.status = format!("Scraping: {}", last_scraped);
        }
        ProtocolEvent::Error {
            message,
            fatal: false,
        } => {
            state.log.push(format!("Error received: {}", message));
        }
        ProtocolEvent::Error {
            message,
            fatal: true,
        } => {
            state.log.push(format!("Critical Error: {}", message));
            state.status = "Failed".to_string();
            state.progress = None;
            state.phase = CrawlPhase::Failed(message.clone());
        }
        ProtocolEvent::Complete { data } => {
            state.results = data.clone();
            state.progress = None;
            state.status = "Completed".to_string();
            state.log.push(format!(
                "Crawl completed. Found {} articles.",
                state.results.len()
            ));
            state.phase = CrawlPhase::Completed;
        }
    }

    state
}

/// The connection ended; without a terminal event the crawl failed locally
pub fn transport_closed(mut state: ClientState) -> ClientState {
    if state.is_terminal() {
        return state;
    }
    let message = "Connection closed before the crawl finished".to_string();
    state.log.push(format!("Critical Error: {}", message));
    state.status = "Failed".to_string();
    state.progress = None;
    state.phase = CrawlPhase::Failed(message);
    state
}

/// The user cancelled
pub fn cancelled(mut state: ClientState) -> ClientState {
    if state.is_terminal() {
        return state;
    }
    state.log.push("Crawl cancelled".to_string());
    state.status = "Cancelled".to_string();
    state.progress = None;
    state.phase = CrawlPhase::Cancelled;
    state
}

/// Replays an event log from a fresh state
pub fn fold_events<'a, I>(url: &str, events: I) -> ClientState
where
    I: IntoIterator<Item = &'a ProtocolEvent>,
{
    events
        .into_iter()
        .fold(ClientState::starting(url), reduce)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/";

    fn article(url: &str) -> Article {
        Article {
            url: url.to_string(),
            title: Some("T".to_string()),
            content: "c".to_string(),
            links: vec![],
            error: None,
        }
    }

    fn progress(current: usize, total: usize, url: &str) -> ProtocolEvent {
        ProtocolEvent::Progress {
            current,
            total,
            last_scraped: url.to_string(),
        }
    }

    #[test]
    fn test_starting_state() {
        let state = ClientState::starting(URL);
        assert_eq!(state.status, "Connecting...");
        assert_eq!(state.phase, CrawlPhase::Running);
        assert!(state.progress.is_none());
        assert!(state.results.is_empty());
        assert_eq!(state.log, vec!["Starting crawl for https://example.com/"]);
    }

    #[test]
    fn test_status_updates_text_and_log_only() {
        let state = reduce(
            ClientState::starting(URL),
            &ProtocolEvent::status("Crawling depth 0..."),
        );
        assert_eq!(state.status, "Crawling depth 0...");
        assert_eq!(state.log.last().unwrap(), "Status: Crawling depth 0...");
        assert!(state.progress.is_none());
        assert_eq!(state.phase, CrawlPhase::Running);
    }

    #[test]
    fn test_found_resets_progress() {
        let state = reduce(ClientState::starting(URL), &ProtocolEvent::found(3));
        assert_eq!(state.progress, Some(Progress { current: 0, total: 3 }));
        assert_eq!(state.status, "Found 3 links to crawl");
    }

    #[test]
    fn test_progress_tracks_last_url() {
        let state = fold_events(
            URL,
            &[ProtocolEvent::found(3), progress(2, 4, "https://example.com/a")],
        );
        assert_eq!(state.progress, Some(Progress { current: 2, total: 4 }));
        assert_eq!(state.status, "Scraping: https://example.com/a");
    }

    #[test]
    fn test_page_error_does_not_touch_results() {
        let state = fold_events(
            URL,
            &[
                progress(1, 2, URL),
                ProtocolEvent::page_error("Failed to fetch https://example.com/x: HTTP 500"),
            ],
        );
        assert_eq!(state.phase, CrawlPhase::Running);
        assert!(state.results.is_empty());
        assert_eq!(state.progress, Some(Progress { current: 1, total: 2 }));
        assert!(state.log.last().unwrap().starts_with("Error received:"));
    }

    #[test]
    fn test_complete_populates_results() {
        let failed = Article::failed("https://example.com/x", "HTTP 500");
        let events = vec![
            ProtocolEvent::status("Connecting..."),
            ProtocolEvent::found(1),
            progress(1, 2, URL),
            ProtocolEvent::page_error("Failed to fetch https://example.com/x: HTTP 500"),
            progress(2, 2, "https://example.com/x"),
            ProtocolEvent::Complete {
                data: vec![article(URL), failed.clone()],
            },
        ];
        let state = fold_events(URL, &events);

        assert_eq!(state.phase, CrawlPhase::Completed);
        assert_eq!(state.status, "Completed");
        assert!(state.progress.is_none());
        assert_eq!(state.results, vec![article(URL), failed]);
        assert_eq!(state.failed_pages(), 1);
    }

    #[test]
    fn test_fatal_error_without_progress() {
        let state = fold_events(
            URL,
            &[
                ProtocolEvent::status("Connecting..."),
                ProtocolEvent::fatal_error("Failed to fetch start URL https://example.com/: HTTP 500"),
            ],
        );
        assert_eq!(
            state.phase,
            CrawlPhase::Failed("Failed to fetch start URL https://example.com/: HTTP 500".to_string())
        );
        assert_eq!(state.status, "Failed");
        assert!(state.results.is_empty());
    }

    #[test]
    fn test_events_after_terminal_are_ignored() {
        let done = fold_events(URL, &[ProtocolEvent::Complete { data: vec![article(URL)] }]);
        let after = reduce(done.clone(), &ProtocolEvent::fatal_error("late"));
        assert_eq!(after, done);

        let after = transport_closed(done.clone());
        assert_eq!(after, done);
    }

    #[test]
    fn test_transport_close_fails_running_crawl() {
        let state = transport_closed(fold_events(URL, &[progress(1, 5, URL)]));
        assert!(matches!(state.phase, CrawlPhase::Failed(_)));
        assert!(state.results.is_empty());
        assert!(state.progress.is_none());
    }

    #[test]
    fn test_cancelled() {
        let state = cancelled(ClientState::starting(URL));
        assert_eq!(state.phase, CrawlPhase::Cancelled);
        assert_eq!(state.status, "Cancelled");
    }

    #[test]
    fn test_replay_is_deterministic() {
        let events = vec![
            ProtocolEvent::found(2),
            progress(1, 2, URL),
            progress(2, 2, "https://example.com/b"),
            ProtocolEvent::Complete {
                data: vec![article(URL), article("https://example.com/b")],
            },
        ];
        assert_eq!(fold_events(URL, &events), fold_events(URL, &events));
    }
}
